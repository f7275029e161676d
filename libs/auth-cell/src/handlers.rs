use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;

use patient_cell::models::Patient;
use patient_cell::services::patient::PatientService;
use shared_models::auth::{require_role, AuthUser, Role, TokenResponse};
use shared_models::error::AppError;
use shared_state::AppState;
use shared_utils::jwt::sign_token;
use shared_utils::password::verify_password;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Exchange patient credentials for a bearer token.
#[axum::debug_handler]
pub async fn login_patient(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let service = PatientService::new(&state);

    let record = service
        .find_record_by_email(request.email.trim())
        .await?
        .ok_or_else(|| AppError::Auth("Invalid credentials".to_string()))?;

    let password_matches = verify_password(&request.password, &record.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !password_matches {
        return Err(AppError::Auth("Invalid credentials".to_string()));
    }

    let user = AuthUser {
        id: record.id,
        email: record.email,
        role: record.role,
    };
    let token = sign_token(&user, &state.config.jwt_secret).map_err(AppError::Internal)?;

    Ok(Json(TokenResponse { token }))
}

/// Profile of the authenticated patient.
#[axum::debug_handler]
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Patient>, AppError> {
    require_role(&user, &[Role::Patient])?;
    debug!("Fetching profile for user: {}", user.id);

    let service = PatientService::new(&state);
    let patient = service.find_by_id(user.id).await?;

    Ok(Json(patient))
}
