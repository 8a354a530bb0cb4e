use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use shared_config::DEFAULT_SLOT_INTERVAL_MINUTES;

use crate::services::availability::parse_time_of_day;

// ==============================================================================
// DOCTOR RECORD
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub name: String,
    pub specialty: String,
    pub appointment_price_in_cents: i64,
    pub available_from_week_day: i32, // 1 = Monday ... 7 = Sunday
    pub available_to_week_day: i32,
    pub available_from_time: String,
    pub available_to_time: String,
}

impl Doctor {
    pub fn working_window(&self) -> WorkingWindow {
        WorkingWindow {
            weekday_from: self.available_from_week_day,
            weekday_to: self.available_to_week_day,
            time_from: self.available_from_time.clone(),
            time_to: self.available_to_time.clone(),
        }
    }
}

/// The part of a doctor's record the availability engine reads.
///
/// Weekdays use Monday = 1 through Sunday = 7 and form a closed range. Times
/// are kept as the raw strings the store returns; they are parsed leniently
/// when slots are generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingWindow {
    pub weekday_from: i32,
    pub weekday_to: i32,
    pub time_from: String,
    pub time_to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertDoctorRequest {
    pub id: Option<Uuid>,
    pub clinic_id: Uuid,
    pub name: String,
    pub specialty: String,
    pub appointment_price_in_cents: i64,
    pub available_from_week_day: i32,
    pub available_to_week_day: i32,
    pub available_from_time: String,
    pub available_to_time: String,
}

impl UpsertDoctorRequest {
    pub fn validate(&self) -> Result<(), DoctorError> {
        if self.name.trim().is_empty() {
            return Err(DoctorError::Validation("Name is required".to_string()));
        }
        if self.specialty.trim().is_empty() {
            return Err(DoctorError::Validation("Specialty is required".to_string()));
        }
        if self.appointment_price_in_cents < 1 {
            return Err(DoctorError::Validation("Appointment price is required".to_string()));
        }

        for (field, day) in [
            ("available_from_week_day", self.available_from_week_day),
            ("available_to_week_day", self.available_to_week_day),
        ] {
            if !(1..=7).contains(&day) {
                return Err(DoctorError::Validation(format!(
                    "{} must be between 1 (Monday) and 7 (Sunday)",
                    field
                )));
            }
        }

        let from = parse_time_of_day(&self.available_from_time)
            .ok_or_else(|| DoctorError::Validation("Start time is required".to_string()))?;
        let to = parse_time_of_day(&self.available_to_time)
            .ok_or_else(|| DoctorError::Validation("End time is required".to_string()))?;

        if from >= to {
            return Err(DoctorError::Validation(
                "Start time must be before end time".to_string(),
            ));
        }

        Ok(())
    }
}

// ==============================================================================
// APPOINTMENTS AS SEEN BY THE ENGINE
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn occupies_slot(self) -> bool {
        match self {
            AppointmentStatus::Confirmed => true,
            AppointmentStatus::Cancelled => false,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedAppointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    #[serde(deserialize_with = "status_or_free")]
    pub status: AppointmentStatus,
}

/// Reads a stored status; anything other than `confirmed`/`cancelled` frees the slot.
fn status_or_free<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AppointmentStatus, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw.as_deref() {
        Some("confirmed") => AppointmentStatus::Confirmed,
        Some("cancelled") => AppointmentStatus::Cancelled,
        other => {
            warn!("Unknown appointment status {:?}, treating it as not occupying a slot", other);
            AppointmentStatus::Cancelled
        }
    })
}

// ==============================================================================
// SLOTS
// ==============================================================================

/// A bookable time of day, always at minute granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(NaiveTime);

impl Slot {
    pub fn from_minutes(minutes_since_midnight: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(minutes_since_midnight / 60, minutes_since_midnight % 60, 0).map(Slot)
    }

    pub fn from_time(time: NaiveTime) -> Self {
        Slot(NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for Slot {
    type Err = DoctorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_time_of_day(s)
            .map(Slot)
            .ok_or_else(|| DoctorError::Validation(format!("Invalid time of day: {}", s)))
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Why a day offers nothing to book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    PastDate,
    OutsideWorkingDays,
    NoWorkingHours,
    FullyBooked,
}

impl UnavailableReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnavailableReason::PastDate => "past_date",
            UnavailableReason::OutsideWorkingDays => "outside_working_days",
            UnavailableReason::NoWorkingHours => "no_working_hours",
            UnavailableReason::FullyBooked => "fully_booked",
        }
    }
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slots offered on one day, with "nothing to offer" spelled out instead of
/// hidden behind an empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayAvailability {
    Open(Vec<Slot>),
    Unavailable(UnavailableReason),
}

impl DayAvailability {
    pub fn slots(&self) -> &[Slot] {
        match self {
            DayAvailability::Open(slots) => slots,
            DayAvailability::Unavailable(_) => &[],
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, DayAvailability::Open(_))
    }

    pub fn reason(&self) -> Option<UnavailableReason> {
        match self {
            DayAvailability::Open(_) => None,
            DayAvailability::Unavailable(reason) => Some(*reason),
        }
    }
}

/// Inputs of a slot computation for one doctor on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotQuery {
    pub time_from: String,
    pub time_to: String,
    pub target_date: NaiveDate,
    pub doctor_id: Uuid,
    pub exclude_appointment_id: Option<Uuid>,
    pub interval_minutes: i64,
}

impl SlotQuery {
    pub fn new(
        time_from: impl Into<String>,
        time_to: impl Into<String>,
        doctor_id: Uuid,
        target_date: NaiveDate,
    ) -> Self {
        Self {
            time_from: time_from.into(),
            time_to: time_to.into(),
            target_date,
            doctor_id,
            exclude_appointment_id: None,
            interval_minutes: DEFAULT_SLOT_INTERVAL_MINUTES,
        }
    }

    pub fn for_window(window: &WorkingWindow, doctor_id: Uuid, target_date: NaiveDate) -> Self {
        Self::new(window.time_from.clone(), window.time_to.clone(), doctor_id, target_date)
    }

    pub fn excluding(mut self, appointment_id: Option<Uuid>) -> Self {
        self.exclude_appointment_id = appointment_id;
        self
    }

    pub fn with_interval(mut self, interval_minutes: i64) -> Self {
        self.interval_minutes = interval_minutes;
        self
    }
}

// ==============================================================================
// RESPONSE DTOS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSlotsResponse {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub status: String,
    pub reason: Option<UnavailableReason>,
    pub available_slots: Vec<Slot>,
    pub total_slots: usize,
}

impl AvailableSlotsResponse {
    pub fn new(doctor_id: Uuid, date: NaiveDate, availability: &DayAvailability) -> Self {
        let available_slots = availability.slots().to_vec();
        let status = if availability.is_open() { "open" } else { "unavailable" };
        Self {
            doctor_id,
            date,
            status: status.to_string(),
            reason: availability.reason(),
            total_slots: available_slots.len(),
            available_slots,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCheck {
    pub date: NaiveDate,
    pub is_date_valid: bool,
    pub is_doctor_available: bool,
}

impl DateCheck {
    pub fn is_bookable(&self) -> bool {
        self.is_date_valid && self.is_doctor_available
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}
