use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use shared_models::auth::{require_role, AuthUser, Role};
use shared_models::error::AppError;
use shared_state::AppState;

use crate::models::{CreatePatientRequest, Patient};
use crate::services::patient::PatientService;

#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Patient>), AppError> {
    let service = PatientService::new(&state);
    let patient = service.register(request).await?;

    Ok((StatusCode::CREATED, Json(patient)))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Patient>, AppError> {
    require_role(&user, &[Role::Admin, Role::Patient])?;

    let service = PatientService::new(&state);
    let patient = service.find_by_id(patient_id).await?;

    Ok(Json(patient))
}
