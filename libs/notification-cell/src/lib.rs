pub mod models;
pub mod service;

pub use models::{AppointmentNotice, NotificationKind, NotificationPayload, NotifyError};
pub use service::{MockProvider, NotificationProvider, NotificationService};
