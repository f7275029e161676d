use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_state::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn patient_routes(state: Arc<AppState>) -> Router {
    // Registration is public; lookups require authentication.
    let public_routes = Router::new().route("/", post(handlers::create_patient));

    let protected_routes = Router::new()
        .route("/{patient_id}", get(handlers::get_patient))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
