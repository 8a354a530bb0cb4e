// libs/appointment-cell/tests/handlers_test.rs

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Weekday;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::router::appointment_routes;
use shared_utils::test_utils::{future_weekday, TestAppointment, TestConfig, TestDoctor};

fn create_test_app(server: &MockServer) -> Router {
    appointment_routes(TestConfig::for_store(server.uri()).to_arc())
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn put_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn mount_doctor_day(server: &MockServer, doctor: &TestDoctor, rows: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", doctor.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor.to_json()])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(rows)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_format_price_endpoint() {
    let server = MockServer::start().await;

    let response = create_test_app(&server)
        .oneshot(get("/price/format?cents=12345"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["formatted"], "123.45");
}

#[tokio::test]
async fn test_parse_price_endpoint() {
    let server = MockServer::start().await;
    let app = create_test_app(&server);

    let response = app.clone().oneshot(get("/price/parse?text=80%2C50")).await.unwrap();
    let body = read_json(response).await;
    assert_eq!(body["cents"], 8050);
    assert_eq!(body["is_valid_price"], true);

    let response = app.oneshot(get("/price/parse?text=abc")).await.unwrap();
    let body = read_json(response).await;
    assert_eq!(body["cents"], 0);
    assert_eq!(body["is_valid_price"], false);
}

#[tokio::test]
async fn test_booking_taken_slot_returns_conflict() {
    let server = MockServer::start().await;
    let doctor = TestDoctor::working(1, 5, "09:00:00", "10:00:00");
    let date = future_weekday(Weekday::Mon);

    mount_doctor_day(
        &server,
        &doctor,
        vec![TestAppointment::confirmed(doctor.id, date, "09:00:00").to_json()],
    )
    .await;

    let response = create_test_app(&server)
        .oneshot(put_json("/", json!({
            "clinic_id": doctor.clinic_id,
            "patient_id": Uuid::new_v4(),
            "doctor_id": doctor.id,
            "date": date,
            "time": "09:00",
            "appointment_price_in_cents": 15000
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("09:00"));
}

#[tokio::test]
async fn test_booking_without_price_is_rejected() {
    let server = MockServer::start().await;
    let doctor = TestDoctor::default();

    let response = create_test_app(&server)
        .oneshot(put_json("/", json!({
            "clinic_id": doctor.clinic_id,
            "patient_id": Uuid::new_v4(),
            "doctor_id": doctor.id,
            "date": future_weekday(Weekday::Mon),
            "time": "09:00",
            "price_text": "R$ 0,00"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_booking_on_day_off_is_bad_request() {
    let server = MockServer::start().await;
    let doctor = TestDoctor::working(1, 5, "09:00:00", "10:00:00");

    mount_doctor_day(&server, &doctor, vec![]).await;

    let response = create_test_app(&server)
        .oneshot(put_json("/", json!({
            "clinic_id": doctor.clinic_id,
            "patient_id": Uuid::new_v4(),
            "doctor_id": doctor.id,
            "date": future_weekday(Weekday::Sat),
            "time": "09:00",
            "appointment_price_in_cents": 15000
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cancel_endpoint() {
    let server = MockServer::start().await;
    let appointment = TestAppointment::cancelled(Uuid::new_v4(), future_weekday(Weekday::Tue), "10:30:00");

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([appointment.to_json()])))
        .mount(&server)
        .await;

    let response = create_test_app(&server)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/{}/cancel", appointment.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["appointment"]["status"], "cancelled");
}

#[tokio::test]
async fn test_get_missing_appointment_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let response = create_test_app(&server)
        .oneshot(get(&format!("/{}", Uuid::new_v4())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
