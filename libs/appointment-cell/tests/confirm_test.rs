use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{AppointmentError, AppointmentStatus};
use appointment_cell::services::booking::BookingService;
use assert_matches::assert_matches;
use notification_cell::{
    NotificationPayload, NotificationProvider, NotificationService, NotifyError,
};
use shared_utils::test_utils::test_state;

struct CountingProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl NotificationProvider for CountingProvider {
    async fn deliver(&self, _payload: &NotificationPayload) -> Result<(), NotifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FailingProvider;

#[async_trait]
impl NotificationProvider for FailingProvider {
    async fn deliver(&self, _payload: &NotificationPayload) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery("provider unreachable".to_string()))
    }
}

async fn mock_detail(server: &MockServer, status: &str) {
    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("id", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "doctor_id": 2,
            "scheduled_at": "2030-10-28T09:00:00Z",
            "status": status,
            "notes": null,
            "doctors": {"name": "Gregory House", "specialty": "Diagnostics"},
            "patients": {"name": "Alice Doe", "email": "alice@example.com"}
        }])))
        .mount(server)
        .await;
}

async fn mock_status_update(server: &MockServer) {
    Mock::given(method("PATCH"))
        .and(path("/appointments"))
        .and(query_param("id", "eq.1"))
        .and(query_param("status", "eq.CREATED"))
        .and(body_json(json!({"status": "CONFIRMED"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(server)
        .await;
}

async fn wait_for(calls: &AtomicUsize, expected: usize) {
    for _ in 0..100 {
        if calls.load(Ordering::SeqCst) == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("notification count never reached {}", expected);
}

#[tokio::test]
async fn confirming_persists_the_transition_and_notifies_once() {
    let server = MockServer::start().await;
    mock_detail(&server, "CREATED").await;
    mock_status_update(&server).await;

    let provider = Arc::new(CountingProvider {
        calls: AtomicUsize::new(0),
    });
    let state = test_state(&server.uri());
    let service = BookingService::with_notifier(
        &state,
        NotificationService::with_provider(provider.clone()),
    );

    let confirmed = service.confirm(1).await.unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

    wait_for(&provider.calls, 1).await;
}

#[tokio::test]
async fn only_created_appointments_can_be_confirmed() {
    let server = MockServer::start().await;
    mock_detail(&server, "CONFIRMED").await;
    // No PATCH mock: a write here would fail the test.

    let state = test_state(&server.uri());
    let service = BookingService::new(&state);

    let err = service.confirm(1).await.unwrap_err();
    assert_matches!(
        err,
        AppointmentError::InvalidStatusTransition(AppointmentStatus::Confirmed)
    );
}

#[tokio::test]
async fn notification_failure_does_not_change_the_result() {
    let server = MockServer::start().await;
    mock_detail(&server, "CREATED").await;
    mock_status_update(&server).await;

    let state = test_state(&server.uri());
    let service = BookingService::with_notifier(
        &state,
        NotificationService::with_provider(Arc::new(FailingProvider)),
    );

    let confirmed = service.confirm(1).await.unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);
}

#[tokio::test]
async fn confirming_a_missing_appointment_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let state = test_state(&server.uri());
    let service = BookingService::new(&state);

    let err = service.confirm(1).await.unwrap_err();
    assert_matches!(err, AppointmentError::NotFound);
}

#[tokio::test]
async fn lost_update_race_surfaces_as_invalid_transition() {
    let server = MockServer::start().await;
    mock_detail(&server, "CREATED").await;

    // The guarded update matched no rows: someone moved the status between
    // the read and the write.
    Mock::given(method("PATCH"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let state = test_state(&server.uri());
    let service = BookingService::new(&state);

    let err = service.confirm(1).await.unwrap_err();
    assert_matches!(err, AppointmentError::InvalidStatusTransition(_));
}
