pub mod booking;
pub mod pricing;

pub use booking::AppointmentBookingService;
pub use pricing::{format_price_from_cents, parse_price_to_cents, PriceInCents};
