// libs/appointment-cell/src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use doctor_cell::models::AppointmentStatus;
use doctor_cell::models::{BookedAppointment, Slot};

use crate::services::pricing::{format_price_from_cents, PriceInCents};

// ==============================================================================
// CORE APPOINTMENT MODEL
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub status: AppointmentStatus,
    pub appointment_price_in_cents: i64,
}

impl Appointment {
    pub fn booked(&self) -> BookedAppointment {
        BookedAppointment {
            id: self.id,
            doctor_id: self.doctor_id,
            patient_id: self.patient_id,
            date: self.date,
            time: self.time.clone(),
            status: self.status,
        }
    }

    pub fn slot(&self) -> Option<Slot> {
        self.time.parse().ok()
    }

    pub fn formatted_price(&self) -> String {
        format_price_from_cents(self.appointment_price_in_cents)
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Create an appointment, or move/edit the one named by `id`.
///
/// The price may be given in cents or as the text a user typed; cents win
/// when both are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertAppointmentRequest {
    pub id: Option<Uuid>,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub appointment_price_in_cents: Option<i64>,
    pub price_text: Option<String>,
}

impl UpsertAppointmentRequest {
    pub fn resolve_price(&self) -> Result<PriceInCents, AppointmentError> {
        let price = match (self.appointment_price_in_cents, self.price_text.as_deref()) {
            (Some(cents), _) => PriceInCents::new(cents),
            (None, Some(text)) => PriceInCents::from_text(text),
            (None, None) => None,
        };

        price.ok_or_else(|| AppointmentError::Validation("Appointment price is required".to_string()))
    }

    pub fn resolve_slot(&self) -> Result<Slot, AppointmentError> {
        self.time
            .parse()
            .map_err(|_| AppointmentError::Validation(format!("Invalid appointment time: {}", self.time)))
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Cannot book a date in the past: {0}")]
    InvalidDate(NaiveDate),

    #[error("Doctor does not work on {0}")]
    DoctorNotAvailable(NaiveDate),

    #[error("Time slot {0} is not available")]
    SlotNotAvailable(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<doctor_cell::models::DoctorError> for AppointmentError {
    fn from(err: doctor_cell::models::DoctorError) -> Self {
        use doctor_cell::models::DoctorError;

        match err {
            DoctorError::NotFound => AppointmentError::DoctorNotFound,
            DoctorError::Validation(msg) => AppointmentError::Validation(msg),
            DoctorError::Database(msg) => AppointmentError::DatabaseError(msg),
        }
    }
}
