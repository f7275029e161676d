use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use shared_models::auth::{require_role, AuthUser, Role};
use shared_models::error::AppError;
use shared_state::AppState;

use crate::models::{CreateDoctorRequest, Doctor, DoctorSummary};
use crate::services::doctor::DoctorService;

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<Doctor>), AppError> {
    require_role(&user, &[Role::Admin])?;

    let service = DoctorService::new(&state);
    let doctor = service.create(request).await?;

    Ok((StatusCode::CREATED, Json(doctor)))
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<DoctorSummary>>, AppError> {
    require_role(&user, &[Role::Patient])?;

    let service = DoctorService::new(&state);
    let doctors = service.find_all().await?;

    Ok(Json(doctors))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Doctor>, AppError> {
    require_role(&user, &[Role::Patient])?;

    let service = DoctorService::new(&state);
    let doctor = service.find_by_id(doctor_id).await?;

    Ok(Json(doctor))
}
