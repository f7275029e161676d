use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{debug, warn};

use shared_models::error::AppError;
use shared_state::AppState;

use crate::service::IdempotencyService;

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// At-most-once guard for mutating endpoints. A duplicate key short-circuits
/// with the stored response before the handler (and any of its side effects)
/// runs; a fresh key lets the handler execute and snapshots its response on
/// success.
///
/// Two requests racing the same key before the first response is stored are
/// not deduplicated: there is no reservation phase, and the store only
/// intercepts duplicates once one of them has completed.
pub async fn idempotency_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let idempotency_key = request
        .headers()
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| AppError::BadRequest("Idempotency-Key header is missing".to_string()))?
        .to_string();

    let service = IdempotencyService::new(state.cache.clone());

    if let Some(record) = service.get_record(&idempotency_key).await {
        debug!("Returning cached response for idempotency key: {}", idempotency_key);
        let status =
            StatusCode::from_u16(record.status).unwrap_or(StatusCode::OK);
        return Ok((status, Json(record.data)).into_response());
    }

    let response = next.run(request).await;

    let status = response.status();
    if status != StatusCode::OK && status != StatusCode::CREATED {
        // Failed operations are never recorded; the client retries for real.
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to buffer response body: {}", e)))?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(data) => service.save_record(&idempotency_key, status.as_u16(), data).await,
        Err(e) => warn!(
            "Skipping idempotency record for key {}: response body is not JSON ({})",
            idempotency_key, e
        ),
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}
