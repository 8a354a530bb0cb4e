// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use shared_config::AppConfig;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_appointments).put(handlers::upsert_appointment))
        .route("/price/format", get(handlers::format_price))
        .route("/price/parse", get(handlers::parse_price))
        .route("/{appointment_id}", get(handlers::get_appointment).delete(handlers::delete_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .with_state(state)
}
