use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub sex: Sex,
}

/// Create a patient, or overwrite the one named by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertPatientRequest {
    pub id: Option<Uuid>,
    pub clinic_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub sex: Sex,
}

impl UpsertPatientRequest {
    pub fn validate(&self) -> Result<(), PatientError> {
        if self.name.trim().is_empty() {
            return Err(PatientError::ValidationError("Name is required".to_string()));
        }
        if !looks_like_email(self.email.trim()) {
            return Err(PatientError::ValidationError(format!("Invalid email: {}", self.email)));
        }
        if self.phone_number.trim().is_empty() {
            return Err(PatientError::ValidationError("Phone number is required".to_string()));
        }
        Ok(())
    }
}

// local@domain.tld, no whitespace
fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !email.contains(char::is_whitespace)
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, phone: &str) -> UpsertPatientRequest {
        UpsertPatientRequest {
            id: None,
            clinic_id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            phone_number: phone.to_string(),
            sex: Sex::Female,
        }
    }

    #[test]
    fn accepts_complete_patient() {
        assert!(request("Maria Lima", "maria@example.com", "+55 11 99999-0000").validate().is_ok());
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(request(" ", "maria@example.com", "123").validate().is_err());
        assert!(request("Maria", "maria@example.com", "").validate().is_err());
    }

    #[test]
    fn rejects_malformed_email() {
        for email in ["", "maria", "maria@", "@example.com", "maria@example", "ma ria@example.com", "a@b@c.com"] {
            assert!(request("Maria", email, "123").validate().is_err(), "{email}");
        }
    }
}
