use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;

/// Doctor detail view. `available_slots` holds canonical RFC3339 UTC
/// timestamps; a slot in the list has no appointment occupying it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub specialty: String,
    pub is_active: bool,
    pub available_slots: Vec<String>,
}

/// List view without the slots column; this is what the cached doctor list
/// stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub id: i64,
    pub name: String,
    pub specialty: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub specialty: String,
    pub available_slots: Vec<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Failed to process credential: {0}")]
    Credential(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound(err.to_string()),
            DoctorError::Credential(msg) => AppError::Internal(msg),
            DoctorError::Database(msg) => AppError::Database(msg),
        }
    }
}
