use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::Extension,
    http::{Request, StatusCode},
    middleware,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use idempotency_cell::middleware::idempotency_middleware;
use shared_utils::test_utils::test_state;

async fn booking_handler(
    Extension(executions): Extension<Arc<AtomicUsize>>,
) -> impl IntoResponse {
    executions.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::CREATED,
        Json(json!({"id": 1, "status": "CREATED"})),
    )
}

async fn conflicting_handler(
    Extension(executions): Extension<Arc<AtomicUsize>>,
) -> impl IntoResponse {
    executions.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::CONFLICT,
        Json(json!({"error": "Doctor is already booked"})),
    )
}

fn build_app(executions: Arc<AtomicUsize>, conflicting: bool) -> Router {
    let state = test_state("http://localhost:54321");
    let method_router = if conflicting {
        post(conflicting_handler)
    } else {
        post(booking_handler)
    };

    Router::new()
        .route("/appointments", method_router)
        .layer(middleware::from_fn_with_state(state, idempotency_middleware))
        .layer(Extension(executions))
}

fn post_appointments(idempotency_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/appointments")
        .header("content-type", "application/json");
    if let Some(key) = idempotency_key {
        builder = builder.header("Idempotency-Key", key);
    }
    builder.body(Body::from("{}")).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn missing_key_is_rejected_before_the_handler_runs() {
    let executions = Arc::new(AtomicUsize::new(0));
    let app = build_app(executions.clone(), false);

    let response = app.oneshot(post_appointments(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Idempotency-Key header is missing");
    assert_eq!(executions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn blank_key_is_rejected() {
    let executions = Arc::new(AtomicUsize::new(0));
    let app = build_app(executions.clone(), false);

    let response = app.oneshot(post_appointments(Some("   "))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(executions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn duplicate_key_replays_the_original_response_without_reexecuting() {
    let executions = Arc::new(AtomicUsize::new(0));
    let app = build_app(executions.clone(), false);

    let first = app
        .clone()
        .oneshot(post_appointments(Some("key-1")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);
    let first_body = body_json(first).await;

    let second = app
        .clone()
        .oneshot(post_appointments(Some("key-1")))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CREATED);
    let second_body = body_json(second).await;

    assert_eq!(first_body, second_body);
    assert_eq!(executions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn distinct_keys_each_execute() {
    let executions = Arc::new(AtomicUsize::new(0));
    let app = build_app(executions.clone(), false);

    app.clone()
        .oneshot(post_appointments(Some("key-a")))
        .await
        .unwrap();
    app.clone()
        .oneshot(post_appointments(Some("key-b")))
        .await
        .unwrap();

    assert_eq!(executions.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_responses_are_not_cached() {
    let executions = Arc::new(AtomicUsize::new(0));
    let app = build_app(executions.clone(), true);

    let first = app
        .clone()
        .oneshot(post_appointments(Some("key-1")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CONFLICT);

    // The retry re-executes the operation from scratch.
    let second = app
        .clone()
        .oneshot(post_appointments(Some("key-1")))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    assert_eq!(executions.load(Ordering::SeqCst), 2);
}
