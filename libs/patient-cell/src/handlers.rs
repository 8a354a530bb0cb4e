use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{PatientError, UpsertPatientRequest};
use crate::services::PatientService;

#[derive(Debug, Deserialize)]
pub struct ClinicQuery {
    pub clinic_id: Uuid,
}

fn to_app_error(err: PatientError) -> AppError {
    match err {
        PatientError::NotFound => AppError::NotFound("Patient not found".to_string()),
        PatientError::ValidationError(msg) => AppError::ValidationError(msg),
        PatientError::DatabaseError(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn list_patients(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<ClinicQuery>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patients = service.list_patients(query.clinic_id)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "patients": patients,
        "total": patients.len()
    })))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(config): State<Arc<AppConfig>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patient = service.get_patient(patient_id)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn upsert_patient(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<UpsertPatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patient = service.upsert_patient(request)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(config): State<Arc<AppConfig>>,
    Path(patient_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = PatientService::new(&config);

    service.delete_patient(patient_id)
        .await
        .map_err(to_app_error)?;

    Ok(StatusCode::NO_CONTENT)
}
