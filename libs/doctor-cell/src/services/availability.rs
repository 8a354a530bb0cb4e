use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate, NaiveTime, Timelike};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    BookedAppointment, DateCheck, DayAvailability, DoctorError, Slot, SlotQuery,
    UnavailableReason, WorkingWindow,
};
use crate::services::doctor::DoctorService;

const TIME_FORMATS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

// ==============================================================================
// CLOCK
// ==============================================================================

/// Source of "today" for date-eligibility checks.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

// ==============================================================================
// ENGINE
// ==============================================================================

/// Parse `HH:MM` or `HH:MM:SS[.fff]`, dropping anything below the minute.
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
        .and_then(|time| NaiveTime::from_hms_opt(time.hour(), time.minute(), 0))
}

fn minutes_since_midnight(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

/// Every slot from `time_from` (inclusive) to `time_to` (exclusive), spaced
/// `interval_minutes` apart.
///
/// Missing or unparseable bounds, an inverted window and a non-positive
/// interval all produce an empty list.
pub fn generate_slots(time_from: &str, time_to: &str, interval_minutes: i64) -> Vec<Slot> {
    if interval_minutes <= 0 {
        warn!("Refusing to generate slots with non-positive interval {}", interval_minutes);
        return Vec::new();
    }

    let (Some(start), Some(end)) = (parse_time_of_day(time_from), parse_time_of_day(time_to)) else {
        debug!("Working window {:?}-{:?} is incomplete, no slots", time_from, time_to);
        return Vec::new();
    };

    let start = minutes_since_midnight(start);
    let end = minutes_since_midnight(end);

    (start..end)
        .step_by(interval_minutes as usize)
        .filter_map(|minute| Slot::from_minutes(minute as u32))
        .collect()
}

/// Slots held by confirmed appointments of the queried doctor on the queried date.
fn occupied_slots(query: &SlotQuery, appointments: &[BookedAppointment]) -> HashSet<Slot> {
    appointments
        .iter()
        .filter(|appointment| appointment.status.occupies_slot())
        .filter(|appointment| appointment.doctor_id == query.doctor_id)
        .filter(|appointment| appointment.date == query.target_date)
        .filter(|appointment| Some(appointment.id) != query.exclude_appointment_id)
        .filter_map(|appointment| match parse_time_of_day(&appointment.time) {
            Some(time) => Some(Slot::from_time(time)),
            None => {
                warn!(
                    "Appointment {} has unreadable time {:?}, ignoring it",
                    appointment.id, appointment.time
                );
                None
            }
        })
        .collect()
}

fn without_occupied(
    candidates: Vec<Slot>,
    query: &SlotQuery,
    appointments: &[BookedAppointment],
) -> Vec<Slot> {
    let occupied = occupied_slots(query, appointments);
    candidates
        .into_iter()
        .filter(|slot| !occupied.contains(slot))
        .collect()
}

/// Generated slots for the query, minus the ones already taken.
///
/// Order follows [`generate_slots`]; taken slots are dropped, not replaced.
pub fn available_slots(query: &SlotQuery, appointments: &[BookedAppointment]) -> Vec<Slot> {
    let candidates = generate_slots(&query.time_from, &query.time_to, query.interval_minutes);
    without_occupied(candidates, query, appointments)
}

/// Day of week in doctor numbering: Monday = 1 ... Sunday = 7.
pub fn doctor_weekday(date: NaiveDate) -> u32 {
    match date.weekday().num_days_from_sunday() {
        0 => 7,
        day => day,
    }
}

pub fn is_doctor_available_on_date(date: NaiveDate, window: &WorkingWindow) -> bool {
    let valid_day = |day: i32| (1..=7).contains(&day);
    if !valid_day(window.weekday_from) || !valid_day(window.weekday_to) {
        return false;
    }

    let day = doctor_weekday(date) as i32;
    window.weekday_from <= day && day <= window.weekday_to
}

/// Same-day booking is allowed, anything before `today` is not.
pub fn is_date_valid(date: NaiveDate, today: NaiveDate) -> bool {
    date >= today
}

/// Full verdict for one doctor on one date.
pub fn day_availability(
    window: &WorkingWindow,
    query: &SlotQuery,
    appointments: &[BookedAppointment],
    today: NaiveDate,
) -> DayAvailability {
    if !is_date_valid(query.target_date, today) {
        return DayAvailability::Unavailable(UnavailableReason::PastDate);
    }
    if !is_doctor_available_on_date(query.target_date, window) {
        return DayAvailability::Unavailable(UnavailableReason::OutsideWorkingDays);
    }

    let candidates = generate_slots(&query.time_from, &query.time_to, query.interval_minutes);
    if candidates.is_empty() {
        return DayAvailability::Unavailable(UnavailableReason::NoWorkingHours);
    }

    let free = without_occupied(candidates, query, appointments);
    if free.is_empty() {
        DayAvailability::Unavailable(UnavailableReason::FullyBooked)
    } else {
        DayAvailability::Open(free)
    }
}

// ==============================================================================
// SERVICE
// ==============================================================================

pub struct AvailabilityService {
    supabase: Arc<SupabaseClient>,
    doctor_service: DoctorService,
    interval_minutes: i64,
    clock: Arc<dyn Clock>,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        Self {
            doctor_service: DoctorService::with_client(Arc::clone(&supabase)),
            supabase,
            interval_minutes: config.slot_interval_minutes,
            clock,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn interval_minutes(&self) -> i64 {
        self.interval_minutes
    }

    /// Slots a doctor can still offer on `date`.
    pub async fn get_available_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<DayAvailability, DoctorError> {
        debug!("Calculating available slots for doctor {} on {}", doctor_id, date);

        let doctor = self.doctor_service.get_doctor(doctor_id).await?;
        let window = doctor.working_window();
        let appointments = self.get_appointments_for_date(doctor_id, date).await?;

        let query = SlotQuery::for_window(&window, doctor_id, date)
            .excluding(exclude_appointment_id)
            .with_interval(self.interval_minutes);

        let availability = day_availability(&window, &query, &appointments, self.today());

        debug!(
            "Doctor {} on {}: {} slots ({:?})",
            doctor_id,
            date,
            availability.slots().len(),
            availability.reason()
        );
        Ok(availability)
    }

    /// Calendar-level eligibility of `date` for a doctor.
    pub async fn check_date(&self, doctor_id: Uuid, date: NaiveDate) -> Result<DateCheck, DoctorError> {
        let doctor = self.doctor_service.get_doctor(doctor_id).await?;

        Ok(DateCheck {
            date,
            is_date_valid: is_date_valid(date, self.today()),
            is_doctor_available: is_doctor_available_on_date(date, &doctor.working_window()),
        })
    }

    /// All appointments of a doctor on `date`, whatever their status.
    pub async fn get_appointments_for_date(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<BookedAppointment>, DoctorError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&select=id,doctor_id,patient_id,date,time,status&order=time.asc",
            doctor_id, date
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<BookedAppointment>, _>>()
            .map_err(|e| DoctorError::Database(format!("Failed to parse appointments: {}", e)))
    }
}
