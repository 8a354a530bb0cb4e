use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Weekday;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use clinic_scheduling_api::router::create_router;
use shared_utils::test_utils::{future_weekday, TestConfig, TestDoctor};

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_root_reports_running() {
    let app = create_router(TestConfig::default().to_arc());

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cells_are_nested() {
    let server = MockServer::start().await;
    let doctor = TestDoctor::working(1, 5, "09:00:00", "10:00:00");

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor.to_json()])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let app = create_router(TestConfig::for_store(server.uri()).to_arc());

    let date = future_weekday(Weekday::Wed);
    let response = app
        .clone()
        .oneshot(get(&format!("/doctors/{}/available-slots?date={}", doctor.id, date)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["available_slots"], json!(["09:00", "09:30"]));

    let response = app.oneshot(get("/appointments/price/format?cents=5")).await.unwrap();
    let body = read_json(response).await;
    assert_eq!(body["formatted"], "0.05");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = create_router(TestConfig::default().to_arc());

    let response = app.oneshot(get("/clinics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patients_are_nested() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let app = create_router(TestConfig::for_store(server.uri()).to_arc());
    let response = app
        .oneshot(get(&format!("/patients?clinic_id={}", uuid::Uuid::new_v4())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["total"], 0);
}
