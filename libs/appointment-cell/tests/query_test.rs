use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{AppointmentError, AppointmentFilter, AppointmentStatus};
use appointment_cell::services::booking::BookingService;
use assert_matches::assert_matches;
use shared_utils::test_utils::test_state;

#[tokio::test]
async fn listing_applies_filters_and_joins_doctor_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("doctor_id", "eq.2"))
        .and(query_param("status", "eq.CONFIRMED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "doctor_id": 2,
                "scheduled_at": "2030-10-28T09:00:00Z",
                "status": "CONFIRMED",
                "notes": null,
                "doctors": {"name": "Gregory House", "specialty": "Diagnostics"}
            },
            {
                "id": 2,
                "doctor_id": 2,
                "scheduled_at": "2030-10-29T10:00:00Z",
                "status": "CONFIRMED",
                "notes": "follow-up",
                "doctors": null
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let state = test_state(&server.uri());
    let service = BookingService::new(&state);

    let filter = AppointmentFilter {
        doctor_id: Some(2),
        status: Some(AppointmentStatus::Confirmed),
        ..Default::default()
    };
    let appointments = service.find_all(filter).await.unwrap();

    assert_eq!(appointments.len(), 2);
    assert_eq!(appointments[0].doctor_name, "Gregory House");
    assert_eq!(
        appointments[0].doctor_specialty.as_deref(),
        Some("Diagnostics")
    );
    assert_eq!(appointments[0].status, AppointmentStatus::Confirmed);
    // A missing join degrades to an empty display name, not an error.
    assert_eq!(appointments[1].doctor_name, "");
}

#[tokio::test]
async fn date_range_filters_are_canonicalized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("scheduled_at", "gte.2030-10-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let state = test_state(&server.uri());
    let service = BookingService::new(&state);

    let filter = AppointmentFilter {
        from: Some("2030-10-01T01:00:00+01:00".parse().unwrap()),
        ..Default::default()
    };
    let appointments = service.find_all(filter).await.unwrap();
    assert!(appointments.is_empty());
}

#[tokio::test]
async fn fetching_one_appointment_joins_both_participants() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("id", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "doctor_id": 2,
            "scheduled_at": "2030-10-28T09:00:00Z",
            "status": "CREATED",
            "notes": "first visit",
            "doctors": {"name": "Gregory House", "specialty": "Diagnostics"},
            "patients": {"name": "Alice Doe", "email": "alice@example.com"}
        }])))
        .mount(&server)
        .await;

    let state = test_state(&server.uri());
    let service = BookingService::new(&state);

    let detail = service.find_one(1).await.unwrap();
    assert_eq!(detail.doctor_name, "Gregory House");
    assert_eq!(detail.patient_name, "Alice Doe");
    assert_eq!(detail.patient_email, "alice@example.com");
    assert_eq!(detail.status, AppointmentStatus::Created);
}

#[tokio::test]
async fn fetching_a_missing_appointment_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let state = test_state(&server.uri());
    let service = BookingService::new(&state);

    let err = service.find_one(99).await.unwrap_err();
    assert_matches!(err, AppointmentError::NotFound);
}
