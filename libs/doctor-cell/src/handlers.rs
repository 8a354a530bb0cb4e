use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{AvailableSlotsResponse, DoctorError, UpsertDoctorRequest};
use crate::services::{availability::AvailabilityService, doctor::DoctorService};

#[derive(Debug, Deserialize)]
pub struct ClinicQuery {
    pub clinic_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AvailableSlotsQuery {
    pub date: NaiveDate,
    pub exclude_appointment_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct DateCheckQuery {
    pub date: NaiveDate,
}

pub(crate) fn to_app_error(err: DoctorError) -> AppError {
    match err {
        DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
        DoctorError::Validation(msg) => AppError::ValidationError(msg),
        DoctorError::Database(msg) => AppError::Database(msg),
    }
}

// ==============================================================================
// DOCTOR RECORDS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<ClinicQuery>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let doctors = doctor_service.list_doctors(query.clinic_id).await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let doctor = doctor_service.get_doctor(doctor_id).await
        .map_err(to_app_error)?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn upsert_doctor(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<UpsertDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let doctor = doctor_service.upsert_doctor(request).await
        .map_err(to_app_error)?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let doctor_service = DoctorService::new(&state);

    doctor_service.delete_doctor(doctor_id).await
        .map_err(to_app_error)?;

    Ok(StatusCode::NO_CONTENT)
}

// ==============================================================================
// AVAILABILITY
// ==============================================================================

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<Json<AvailableSlotsResponse>, AppError> {
    let availability_service = AvailabilityService::new(&state);

    let availability = availability_service
        .get_available_slots(doctor_id, query.date, query.exclude_appointment_id)
        .await
        .map_err(to_app_error)?;

    Ok(Json(AvailableSlotsResponse::new(doctor_id, query.date, &availability)))
}

#[axum::debug_handler]
pub async fn check_date(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<DateCheckQuery>,
) -> Result<Json<Value>, AppError> {
    let availability_service = AvailabilityService::new(&state);

    let check = availability_service.check_date(doctor_id, query.date).await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "date": check.date,
        "is_date_valid": check.is_date_valid,
        "is_doctor_available": check.is_doctor_available,
        "is_bookable": check.is_bookable()
    })))
}
