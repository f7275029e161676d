use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Confirmation,
    Cancellation,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Confirmation => write!(f, "CONFIRMATION"),
            NotificationKind::Cancellation => write!(f, "CANCELLATION"),
        }
    }
}

/// The slice of a joined appointment the dispatcher needs to format a
/// message. Kept independent of the appointment cell's own types so the
/// dependency points one way only.
#[derive(Debug, Clone)]
pub struct AppointmentNotice {
    pub appointment_id: i64,
    pub patient_name: String,
    pub patient_email: String,
    pub doctor_name: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationPayload {
    pub appointment_id: i64,
    pub to_email: String,
    pub subject: String,
    pub body: String,
    pub kind: NotificationKind,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}
