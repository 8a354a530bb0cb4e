// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::models::SlotQuery;
use doctor_cell::services::availability::{
    available_slots, is_date_valid, is_doctor_available_on_date, AvailabilityService, Clock,
    SystemClock,
};
use doctor_cell::services::doctor::DoctorService;
use shared_config::AppConfig;
use shared_database::supabase::{is_conflict, SupabaseClient};

use crate::models::{Appointment, AppointmentError, AppointmentStatus, UpsertAppointmentRequest};

/// Books appointments after re-checking the requested slot against the
/// doctor's current schedule.
///
/// The check and the write are separate requests, so two bookings racing for
/// the same slot can both pass the check. The store is expected to hold a
/// unique index on confirmed `(doctor_id, date, time)`; a conflict from that
/// index is reported as [`AppointmentError::SlotNotAvailable`].
pub struct AppointmentBookingService {
    supabase: Arc<SupabaseClient>,
    doctor_service: DoctorService,
    availability_service: AvailabilityService,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        Self {
            doctor_service: DoctorService::with_client(Arc::clone(&supabase)),
            availability_service: AvailabilityService::with_clock(config, clock),
            supabase,
        }
    }

    /// Create or reschedule an appointment. The result is always confirmed.
    pub async fn upsert_appointment(
        &self,
        request: UpsertAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!(
            "Booking doctor {} on {} at {} (editing: {:?})",
            request.doctor_id, request.date, request.time, request.id
        );

        let price = request.resolve_price()?;
        let slot = request.resolve_slot()?;

        let doctor = self.doctor_service.get_doctor(request.doctor_id).await?;
        let window = doctor.working_window();

        if !is_date_valid(request.date, self.availability_service.today()) {
            return Err(AppointmentError::InvalidDate(request.date));
        }
        if !is_doctor_available_on_date(request.date, &window) {
            return Err(AppointmentError::DoctorNotAvailable(request.date));
        }

        let existing = self
            .availability_service
            .get_appointments_for_date(doctor.id, request.date)
            .await?;

        let query = SlotQuery::for_window(&window, doctor.id, request.date)
            .excluding(request.id)
            .with_interval(self.availability_service.interval_minutes());

        if !available_slots(&query, &existing).contains(&slot) {
            warn!("Slot {} on {} is not free for doctor {}", slot, request.date, doctor.id);
            return Err(AppointmentError::SlotNotAvailable(slot.to_string()));
        }

        let appointment_id = request.id.unwrap_or_else(Uuid::new_v4);
        let appointment_data = json!({
            "id": appointment_id,
            "clinic_id": request.clinic_id,
            "patient_id": request.patient_id,
            "doctor_id": doctor.id,
            "date": request.date,
            "time": slot.to_string(),
            "status": AppointmentStatus::Confirmed,
            "appointment_price_in_cents": price.cents(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(appointment_data),
                Some(SupabaseClient::upsert_representation()),
            )
            .await
            .map_err(|e| {
                if is_conflict(&e) {
                    AppointmentError::SlotNotAvailable(slot.to_string())
                } else {
                    AppointmentError::DatabaseError(e.to_string())
                }
            })?;

        let appointment = first_appointment(result)?
            .ok_or_else(|| AppointmentError::DatabaseError("Failed to save appointment".to_string()))?;

        info!(
            "Appointment {} confirmed for doctor {} on {} at {}",
            appointment.id, appointment.doctor_id, appointment.date, appointment.time
        );
        Ok(appointment)
    }

    /// Mark an appointment cancelled, which frees its slot.
    pub async fn cancel_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        debug!("Cancelling appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(json!({
                    "status": AppointmentStatus::Cancelled,
                    "updated_at": Utc::now().to_rfc3339()
                })),
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let appointment = first_appointment(result)?.ok_or(AppointmentError::NotFound)?;

        info!("Appointment {} cancelled", appointment_id);
        Ok(appointment)
    }

    pub async fn delete_appointment(&self, appointment_id: Uuid) -> Result<(), AppointmentError> {
        debug!("Deleting appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &path,
                None,
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        info!("Appointment {} deleted", appointment_id);
        Ok(())
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        first_appointment(result)?.ok_or(AppointmentError::NotFound)
    }

    pub async fn list_appointments(&self, clinic_id: Uuid) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing appointments for clinic: {}", clinic_id);

        let path = format!(
            "/rest/v1/appointments?clinic_id=eq.{}&order=date.asc,time.asc",
            clinic_id
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e)))
    }
}

fn first_appointment(rows: Vec<Value>) -> Result<Option<Appointment>, AppointmentError> {
    rows.into_iter()
        .next()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
}
