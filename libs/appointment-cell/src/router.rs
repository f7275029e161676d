use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use idempotency_cell::middleware::idempotency_middleware;
use shared_state::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppState>) -> Router {
    // Only the booking endpoint is guarded by the idempotency layer; reads
    // and confirmation pass straight through.
    Router::new()
        .route(
            "/",
            post(handlers::create_appointment).route_layer(middleware::from_fn_with_state(
                state.clone(),
                idempotency_middleware,
            )),
        )
        .route("/", get(handlers::list_appointments))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/confirm", post(handlers::confirm_appointment))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
