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

use crate::models::{AppointmentError, UpsertAppointmentRequest};
use crate::services::booking::AppointmentBookingService;
use crate::services::pricing::{format_price_from_cents, parse_price_to_cents};

#[derive(Debug, Deserialize)]
pub struct ClinicQuery {
    pub clinic_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct FormatPriceQuery {
    pub cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct ParsePriceQuery {
    #[serde(default)]
    pub text: String,
}

fn to_app_error(err: AppointmentError) -> AppError {
    let message = err.to_string();
    match err {
        AppointmentError::NotFound => AppError::NotFound(message),
        AppointmentError::DoctorNotFound => AppError::NotFound(message),
        AppointmentError::InvalidDate(_) | AppointmentError::DoctorNotAvailable(_) => {
            AppError::BadRequest(message)
        }
        AppointmentError::SlotNotAvailable(_) => AppError::Conflict(message),
        AppointmentError::Validation(msg) => AppError::ValidationError(msg),
        AppointmentError::DatabaseError(msg) => AppError::Database(msg),
    }
}

// ==============================================================================
// APPOINTMENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<ClinicQuery>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointments = booking_service.list_appointments(query.clinic_id).await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service.get_appointment(appointment_id).await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "appointment": appointment,
        "formatted_price": appointment.formatted_price()
    })))
}

#[axum::debug_handler]
pub async fn upsert_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<UpsertAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service.upsert_appointment(request).await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment booked successfully"
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let cancelled_appointment = booking_service.cancel_appointment(appointment_id).await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": cancelled_appointment,
        "message": "Appointment cancelled successfully"
    })))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    booking_service.delete_appointment(appointment_id).await
        .map_err(to_app_error)?;

    Ok(StatusCode::NO_CONTENT)
}

// ==============================================================================
// PRICE HELPERS
// ==============================================================================

pub async fn format_price(Query(query): Query<FormatPriceQuery>) -> Json<Value> {
    Json(json!({
        "cents": query.cents,
        "formatted": format_price_from_cents(query.cents)
    }))
}

pub async fn parse_price(Query(query): Query<ParsePriceQuery>) -> Json<Value> {
    let cents = parse_price_to_cents(&query.text);
    Json(json!({
        "text": query.text,
        "cents": cents,
        "is_valid_price": cents >= 1
    }))
}
