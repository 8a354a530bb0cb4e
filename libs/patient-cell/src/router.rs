use std::sync::Arc;
use axum::{routing::get, Router};
use shared_config::AppConfig;

use crate::handlers::*;

pub fn patient_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(list_patients).put(upsert_patient))
        .route("/{patient_id}", get(get_patient).delete(delete_patient))
        .with_state(config)
}
