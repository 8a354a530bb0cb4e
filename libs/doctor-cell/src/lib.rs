pub mod handlers;
pub mod router;
pub mod models;
pub mod services;

pub use models::*;
pub use services::*;

pub use services::availability::{
    available_slots, day_availability, doctor_weekday, generate_slots,
    is_date_valid, is_doctor_available_on_date, parse_time_of_day,
};
