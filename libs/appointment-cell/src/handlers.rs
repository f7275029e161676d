use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use shared_models::auth::{require_role, AuthUser, Role};
use shared_models::error::AppError;
use shared_state::AppState;

use crate::models::{
    Appointment, AppointmentDetail, AppointmentFilter, AppointmentSummary,
    CreateAppointmentRequest,
};
use crate::services::booking::BookingService;

/// Book an appointment for the authenticated patient. The idempotency
/// middleware in front of this handler takes care of duplicate
/// submissions.
#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    require_role(&user, &[Role::Patient])?;

    let service = BookingService::new(&state);
    let appointment = service.create(user.id, request).await?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<AppointmentFilter>,
) -> Result<Json<Vec<AppointmentSummary>>, AppError> {
    require_role(&user, &[Role::Patient])?;

    let service = BookingService::new(&state);
    let appointments = service.find_all(filter).await?;

    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<AppointmentDetail>, AppError> {
    require_role(&user, &[Role::Patient])?;

    let service = BookingService::new(&state);
    let appointment = service.find_one(appointment_id).await?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<AppointmentDetail>, AppError> {
    require_role(&user, &[Role::Patient])?;

    let service = BookingService::new(&state);
    let appointment = service.confirm(appointment_id).await?;

    Ok(Json(appointment))
}
