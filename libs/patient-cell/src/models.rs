use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::auth::Role;
use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub phone: Option<String>,
    pub role: Role,
}

/// Full row including the credential hash; only used internally and by the
/// login flow, never serialized to the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct PatientRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub birth_date: NaiveDate,
    pub phone: Option<String>,
    pub role: Role,
}

impl PatientRecord {
    pub fn into_public(self) -> Patient {
        Patient {
            id: self.id,
            name: self.name,
            email: self.email,
            birth_date: self.birth_date,
            phone: self.phone,
            role: self.role,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePatientRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub birth_date: NaiveDate,
    pub phone: Option<String>,
}

#[derive(Debug, Error)]
pub enum PatientError {
    #[error("Patient with this email already exists")]
    EmailTaken,

    #[error("Patient not found")]
    NotFound,

    #[error("Failed to process credential: {0}")]
    Credential(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::EmailTaken => AppError::Conflict(err.to_string()),
            PatientError::NotFound => AppError::NotFound(err.to_string()),
            PatientError::Credential(msg) => AppError::Internal(msg),
            PatientError::Database(msg) => AppError::Database(msg),
        }
    }
}
