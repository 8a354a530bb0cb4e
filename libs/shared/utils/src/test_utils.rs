use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub slot_interval_minutes: i64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            slot_interval_minutes: 30,
        }
    }
}

impl TestConfig {
    /// Config aimed at a mock store, typically `MockServer::uri()`.
    pub fn for_store(supabase_url: impl Into<String>) -> Self {
        Self {
            supabase_url: supabase_url.into(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        let mut config = AppConfig::with_store(self.supabase_url.clone(), self.supabase_anon_key.clone());
        config.slot_interval_minutes = self.slot_interval_minutes;
        config
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// A doctor row as the store returns it.
pub struct TestDoctor {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub name: String,
    pub specialty: String,
    pub price_in_cents: i64,
    pub weekday_from: i32,
    pub weekday_to: i32,
    pub time_from: String,
    pub time_to: String,
}

impl Default for TestDoctor {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            clinic_id: Uuid::new_v4(),
            name: "Dr. Ana Souza".to_string(),
            specialty: "Cardiology".to_string(),
            price_in_cents: 15000,
            weekday_from: 1,
            weekday_to: 5,
            time_from: "09:00:00".to_string(),
            time_to: "12:00:00".to_string(),
        }
    }
}

impl TestDoctor {
    pub fn working(weekday_from: i32, weekday_to: i32, time_from: &str, time_to: &str) -> Self {
        Self {
            weekday_from,
            weekday_to,
            time_from: time_from.to_string(),
            time_to: time_to.to_string(),
            ..Self::default()
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "clinic_id": self.clinic_id,
            "name": self.name,
            "specialty": self.specialty,
            "appointment_price_in_cents": self.price_in_cents,
            "available_from_week_day": self.weekday_from,
            "available_to_week_day": self.weekday_to,
            "available_from_time": self.time_from,
            "available_to_time": self.time_to,
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        })
    }
}

/// An appointment row as the store returns it.
pub struct TestAppointment {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub status: String,
    pub price_in_cents: i64,
}

impl TestAppointment {
    pub fn confirmed(doctor_id: Uuid, date: NaiveDate, time: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            clinic_id: Uuid::new_v4(),
            doctor_id,
            patient_id: Uuid::new_v4(),
            date,
            time: time.to_string(),
            status: "confirmed".to_string(),
            price_in_cents: 15000,
        }
    }

    pub fn cancelled(doctor_id: Uuid, date: NaiveDate, time: &str) -> Self {
        Self {
            status: "cancelled".to_string(),
            ..Self::confirmed(doctor_id, date, time)
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "clinic_id": self.clinic_id,
            "doctor_id": self.doctor_id,
            "patient_id": self.patient_id,
            "date": self.date,
            "time": self.time,
            "status": self.status,
            "appointment_price_in_cents": self.price_in_cents,
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        })
    }
}

/// A patient row as the store returns it.
pub struct TestPatient {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub sex: String,
}

impl Default for TestPatient {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            clinic_id: Uuid::new_v4(),
            name: "Maria Lima".to_string(),
            email: "maria.lima@example.com".to_string(),
            phone_number: "+55 11 98888-7777".to_string(),
            sex: "female".to_string(),
        }
    }
}

impl TestPatient {
    pub fn named(clinic_id: Uuid, name: &str) -> Self {
        Self {
            clinic_id,
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "clinic_id": self.clinic_id,
            "name": self.name,
            "email": self.email,
            "phone_number": self.phone_number,
            "sex": self.sex,
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        })
    }
}

/// A weekday far enough ahead that "today" never overtakes it.
pub fn future_weekday(weekday: chrono::Weekday) -> NaiveDate {
    use chrono::Datelike;

    let mut date = NaiveDate::from_ymd_opt(2099, 1, 5).unwrap_or(NaiveDate::MAX);
    while date.weekday() != weekday {
        date = date.succ_opt().unwrap_or(date);
    }
    date
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code,
            "details": null,
            "hint": null
        })
    }

    pub fn unique_violation() -> serde_json::Value {
        Self::error_response(
            "duplicate key value violates unique constraint \"appointments_confirmed_slot_key\"",
            "23505",
        )
    }
}
