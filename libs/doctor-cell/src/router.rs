use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_doctors).put(handlers::upsert_doctor))
        .route("/{doctor_id}", get(handlers::get_doctor).delete(handlers::delete_doctor))
        .route("/{doctor_id}/available-slots", get(handlers::get_available_slots))
        .route("/{doctor_id}/date-check", get(handlers::check_date))
        .with_state(state)
}
