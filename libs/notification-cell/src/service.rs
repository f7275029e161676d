use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info};

use crate::models::{AppointmentNotice, NotificationKind, NotificationPayload, NotifyError};

/// External delivery mechanism. The real provider is out of scope; the
/// default implementation only logs.
#[async_trait]
pub trait NotificationProvider: Send + Sync {
    async fn deliver(&self, payload: &NotificationPayload) -> Result<(), NotifyError>;
}

pub struct MockProvider;

#[async_trait]
impl NotificationProvider for MockProvider {
    async fn deliver(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        // Simulate provider latency.
        tokio::time::sleep(Duration::from_millis(50)).await;
        info!("MOCK SENT: Notification successfully logged for: {}", payload.to_email);
        Ok(())
    }
}

/// Formats status-change messages and hands them to the provider. Delivery
/// runs after the state change is already durable, so a failure here is
/// logged and swallowed; it never reaches the caller and is never retried.
#[derive(Clone)]
pub struct NotificationService {
    provider: Arc<dyn NotificationProvider>,
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationService {
    pub fn new() -> Self {
        Self {
            provider: Arc::new(MockProvider),
        }
    }

    pub fn with_provider(provider: Arc<dyn NotificationProvider>) -> Self {
        Self { provider }
    }

    pub fn build_payload(
        notice: &AppointmentNotice,
        kind: NotificationKind,
    ) -> NotificationPayload {
        let formatted_date = notice.scheduled_at.format("%Y-%m-%d %H:%M");

        let subject = format!(
            "{} ALERT: Appointment {} with Dr. {}",
            kind, notice.status, notice.doctor_name
        );
        let body = format!(
            "Your appointment on {} has been {}. Notes: {}",
            formatted_date,
            notice.status,
            notice.notes.as_deref().unwrap_or("")
        );

        NotificationPayload {
            appointment_id: notice.appointment_id,
            to_email: notice.patient_email.clone(),
            subject,
            body,
            kind,
        }
    }

    pub async fn send_appointment_notification(
        &self,
        notice: &AppointmentNotice,
        kind: NotificationKind,
    ) {
        let payload = Self::build_payload(notice, kind);

        info!(
            "Dispatching {} notification for appointment {} to {} (Dr. {})",
            kind, notice.appointment_id, payload.to_email, notice.doctor_name
        );

        if let Err(e) = self.provider.deliver(&payload).await {
            error!(
                "Failed to send notification for appointment {}: {}",
                notice.appointment_id, e
            );
        }
    }
}
