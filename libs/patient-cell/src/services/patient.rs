use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Patient, PatientError, UpsertPatientRequest};

pub struct PatientService {
    supabase: SupabaseClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Insert a patient, or overwrite it when `id` names an existing one.
    pub async fn upsert_patient(&self, request: UpsertPatientRequest) -> Result<Patient, PatientError> {
        request.validate()?;

        let patient_id = request.id.unwrap_or_else(Uuid::new_v4);
        debug!("Saving patient {} for clinic {}", patient_id, request.clinic_id);

        let patient_data = json!({
            "id": patient_id,
            "clinic_id": request.clinic_id,
            "name": request.name.trim(),
            "email": request.email.trim(),
            "phone_number": request.phone_number.trim(),
            "sex": request.sex,
        });

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/patients",
                Some(patient_data),
                Some(SupabaseClient::upsert_representation()),
            )
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let patient = first_patient(result)?
            .ok_or_else(|| PatientError::DatabaseError("Failed to save patient".to_string()))?;

        info!("Patient {} saved for clinic {}", patient.id, patient.clinic_id);
        Ok(patient)
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        debug!("Fetching patient: {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        first_patient(result)?.ok_or(PatientError::NotFound)
    }

    pub async fn list_patients(&self, clinic_id: Uuid) -> Result<Vec<Patient>, PatientError> {
        debug!("Listing patients for clinic: {}", clinic_id);

        let path = format!("/rest/v1/patients?clinic_id=eq.{}&order=name.asc", clinic_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Patient>, _>>()
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patients: {}", e)))
    }

    pub async fn delete_patient(&self, patient_id: Uuid) -> Result<(), PatientError> {
        debug!("Deleting patient: {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &path,
                None,
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(PatientError::NotFound);
        }

        info!("Patient {} deleted", patient_id);
        Ok(())
    }
}

fn first_patient(rows: Vec<Value>) -> Result<Option<Patient>, PatientError> {
    rows.into_iter()
        .next()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e)))
}
