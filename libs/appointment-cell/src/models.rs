use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Created,
    Confirmed,
    Cancelled,
    Completed,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Created => write!(f, "CREATED"),
            AppointmentStatus::Confirmed => write!(f, "CONFIRMED"),
            AppointmentStatus::Cancelled => write!(f, "CANCELLED"),
            AppointmentStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl AppointmentStatus {
    /// Only freshly created appointments can be confirmed.
    pub fn can_confirm(self) -> bool {
        matches!(self, AppointmentStatus::Created)
    }

    /// Cancelled appointments do not count for double-booking checks.
    pub fn blocks_slot(self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub doctor_id: i64,
    pub patient_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub doctor_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct AppointmentFilter {
    pub doctor_id: Option<i64>,
    pub patient_id: Option<i64>,
    pub status: Option<AppointmentStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Listing row with the doctor display fields denormalized in.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentSummary {
    pub id: i64,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub doctor_specialty: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

/// Single-appointment view joined with both participants.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentDetail {
    pub id: i64,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub doctor_specialty: Option<String>,
    pub patient_name: String,
    pub patient_email: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

// Raw rows as the data API returns them, with embedded join objects.

#[derive(Debug, Deserialize)]
pub(crate) struct DoctorJoin {
    pub name: String,
    pub specialty: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PatientJoin {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryRow {
    pub id: i64,
    pub doctor_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub doctors: Option<DoctorJoin>,
}

impl SummaryRow {
    pub fn into_summary(self) -> AppointmentSummary {
        let (doctor_name, doctor_specialty) = match self.doctors {
            Some(doctor) => (doctor.name, doctor.specialty),
            None => (String::new(), None),
        };

        AppointmentSummary {
            id: self.id,
            doctor_id: self.doctor_id,
            doctor_name,
            doctor_specialty,
            scheduled_at: self.scheduled_at,
            status: self.status,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailRow {
    pub id: i64,
    pub doctor_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub doctors: Option<DoctorJoin>,
    pub patients: Option<PatientJoin>,
}

impl DetailRow {
    pub fn into_detail(self) -> AppointmentDetail {
        let (doctor_name, doctor_specialty) = match self.doctors {
            Some(doctor) => (doctor.name, doctor.specialty),
            None => (String::new(), None),
        };
        let (patient_name, patient_email) = match self.patients {
            Some(patient) => (patient.name, patient.email),
            None => (String::new(), String::new()),
        };

        AppointmentDetail {
            id: self.id,
            doctor_id: self.doctor_id,
            doctor_name,
            doctor_specialty,
            patient_name,
            patient_email,
            scheduled_at: self.scheduled_at,
            status: self.status,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("Patient not found")]
    PatientNotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Doctor is not active and cannot take appointments")]
    DoctorNotActive,

    #[error("The requested time slot is not in the doctor's available slots")]
    SlotNotAvailable,

    #[error("Dr. {doctor_name} is already booked at {scheduled_at}")]
    DoctorAlreadyBooked {
        doctor_name: String,
        scheduled_at: String,
    },

    #[error("You already have an appointment booked at {scheduled_at}")]
    PatientAlreadyBooked { scheduled_at: String },

    #[error("An appointment already exists at {scheduled_at}")]
    SlotTaken { scheduled_at: String },

    #[error("Appointment not found")]
    NotFound,

    #[error("Only appointments with status CREATED can be confirmed (current: {0})")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match &err {
            AppointmentError::PatientNotFound
            | AppointmentError::DoctorNotFound
            | AppointmentError::NotFound => AppError::NotFound(err.to_string()),
            AppointmentError::SlotNotAvailable => AppError::BadRequest(err.to_string()),
            AppointmentError::DoctorNotActive
            | AppointmentError::DoctorAlreadyBooked { .. }
            | AppointmentError::PatientAlreadyBooked { .. }
            | AppointmentError::SlotTaken { .. }
            | AppointmentError::InvalidStatusTransition(_) => AppError::Conflict(err.to_string()),
            AppointmentError::Database(msg) => AppError::Database(msg.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_format_is_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&AppointmentStatus::Created).unwrap(),
            "\"CREATED\""
        );
        let status: AppointmentStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(status, AppointmentStatus::Cancelled);
    }

    #[test]
    fn only_created_can_confirm() {
        assert!(AppointmentStatus::Created.can_confirm());
        assert!(!AppointmentStatus::Confirmed.can_confirm());
        assert!(!AppointmentStatus::Cancelled.can_confirm());
        assert!(!AppointmentStatus::Completed.can_confirm());
    }

    #[test]
    fn cancelled_appointments_do_not_block_slots() {
        assert!(AppointmentStatus::Created.blocks_slot());
        assert!(AppointmentStatus::Confirmed.blocks_slot());
        assert!(AppointmentStatus::Completed.blocks_slot());
        assert!(!AppointmentStatus::Cancelled.blocks_slot());
    }
}
