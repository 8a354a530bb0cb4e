use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Doctor, DoctorError, UpsertDoctorRequest};

pub struct DoctorService {
    supabase: Arc<SupabaseClient>,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(Arc::new(SupabaseClient::new(config)))
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor: {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let row = result.into_iter().next().ok_or(DoctorError::NotFound)?;
        parse_doctor(row)
    }

    pub async fn list_doctors(&self, clinic_id: Uuid) -> Result<Vec<Doctor>, DoctorError> {
        debug!("Listing doctors for clinic: {}", clinic_id);

        let path = format!("/rest/v1/doctors?clinic_id=eq.{}&order=name.asc", clinic_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        result.into_iter().map(parse_doctor).collect()
    }

    /// Insert a doctor, or overwrite it when `id` names an existing one.
    pub async fn upsert_doctor(&self, request: UpsertDoctorRequest) -> Result<Doctor, DoctorError> {
        request.validate()?;

        if request.available_from_week_day > request.available_to_week_day {
            warn!(
                "Doctor {} has inverted weekday range {}-{}, no day will be bookable",
                request.name, request.available_from_week_day, request.available_to_week_day
            );
        }

        let doctor_id = request.id.unwrap_or_else(Uuid::new_v4);
        let doctor_data = json!({
            "id": doctor_id,
            "clinic_id": request.clinic_id,
            "name": request.name.trim(),
            "specialty": request.specialty.trim(),
            "appointment_price_in_cents": request.appointment_price_in_cents,
            "available_from_week_day": request.available_from_week_day,
            "available_to_week_day": request.available_to_week_day,
            "available_from_time": request.available_from_time,
            "available_to_time": request.available_to_time,
        });

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/doctors",
                Some(doctor_data),
                Some(SupabaseClient::upsert_representation()),
            )
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| DoctorError::Database("Failed to save doctor".to_string()))?;
        let doctor = parse_doctor(row)?;

        info!("Doctor {} saved for clinic {}", doctor.id, doctor.clinic_id);
        Ok(doctor)
    }

    pub async fn delete_doctor(&self, doctor_id: Uuid) -> Result<(), DoctorError> {
        debug!("Deleting doctor: {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &path,
                None,
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        if result.is_empty() {
            return Err(DoctorError::NotFound);
        }

        info!("Doctor {} deleted", doctor_id);
        Ok(())
    }
}

fn parse_doctor(row: Value) -> Result<Doctor, DoctorError> {
    serde_json::from_value(row)
        .map_err(|e| DoctorError::Database(format!("Failed to parse doctor: {}", e)))
}
