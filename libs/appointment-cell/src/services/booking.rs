use serde_json::json;
use tracing::{debug, info, warn};

use doctor_cell::models::DoctorError;
use doctor_cell::services::availability::{canonical_slot, AvailabilityStore};
use doctor_cell::services::doctor::DoctorService;
use notification_cell::{AppointmentNotice, NotificationKind, NotificationService};
use patient_cell::models::PatientError;
use patient_cell::services::patient::PatientService;
use shared_database::{DbError, PostgrestClient};
use shared_state::AppState;

use crate::models::{
    Appointment, AppointmentDetail, AppointmentError, AppointmentFilter, AppointmentStatus,
    AppointmentSummary, CreateAppointmentRequest, DetailRow, SummaryRow,
};

const APPOINTMENT_COLUMNS: &str = "id,doctor_id,patient_id,scheduled_at,status,notes";
const SUMMARY_SELECT: &str = "id,doctor_id,scheduled_at,status,notes,doctors(name,specialty)";
const DETAIL_SELECT: &str =
    "id,doctor_id,scheduled_at,status,notes,doctors(name,specialty),patients(name,email)";

/// Orchestrates validation, conflict detection, slot reservation and
/// persistence for appointments.
pub struct BookingService {
    db: PostgrestClient,
    patients: PatientService,
    doctors: DoctorService,
    availability: AvailabilityStore,
    notifications: NotificationService,
}

impl BookingService {
    pub fn new(state: &AppState) -> Self {
        Self::with_notifier(state, NotificationService::new())
    }

    pub fn with_notifier(state: &AppState, notifications: NotificationService) -> Self {
        Self {
            db: state.db.clone(),
            patients: PatientService::new(state),
            doctors: DoctorService::new(state),
            availability: AvailabilityStore::new(state),
            notifications,
        }
    }

    /// Book a new appointment with status CREATED. Validation short-circuits
    /// in a fixed order; nothing is persisted before every rule has passed.
    pub async fn create(
        &self,
        patient_id: i64,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for patient {} with doctor {}",
            patient_id, request.doctor_id
        );

        self.patients
            .find_by_id(patient_id)
            .await
            .map_err(|e| match e {
                PatientError::NotFound => AppointmentError::PatientNotFound,
                other => AppointmentError::Database(other.to_string()),
            })?;

        let doctor = self
            .doctors
            .find_by_id(request.doctor_id)
            .await
            .map_err(|e| match e {
                DoctorError::NotFound => AppointmentError::DoctorNotFound,
                other => AppointmentError::Database(other.to_string()),
            })?;

        if !doctor.is_active {
            return Err(AppointmentError::DoctorNotActive);
        }

        let slot = canonical_slot(request.scheduled_at);

        let slot_open = self
            .availability
            .slot_exists(request.doctor_id, request.scheduled_at)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;
        if !slot_open {
            return Err(AppointmentError::SlotNotAvailable);
        }

        if self
            .booked_at("doctor_id", request.doctor_id, &slot)
            .await?
        {
            return Err(AppointmentError::DoctorAlreadyBooked {
                doctor_name: doctor.name,
                scheduled_at: slot,
            });
        }

        if self.booked_at("patient_id", patient_id, &slot).await? {
            return Err(AppointmentError::PatientAlreadyBooked { scheduled_at: slot });
        }

        let appointment_data = json!({
            "doctor_id": request.doctor_id,
            "patient_id": patient_id,
            "scheduled_at": slot,
            "status": AppointmentStatus::Created,
            "notes": request.notes,
        });

        let appointment: Appointment = self
            .db
            .insert(
                &format!("/appointments?select={}", APPOINTMENT_COLUMNS),
                appointment_data,
            )
            .await
            .map_err(|e| match e {
                // Lost the race between the double check and the insert;
                // the partial unique indexes are the final arbiter.
                DbError::UniqueViolation(_) => AppointmentError::SlotTaken {
                    scheduled_at: slot.clone(),
                },
                other => AppointmentError::Database(other.to_string()),
            })?;

        // The appointment is already committed. A failed removal leaves the
        // consumed slot listed as available until reconciliation; it must
        // not roll the booking back.
        if let Err(e) = self
            .availability
            .remove_slot(request.doctor_id, request.scheduled_at)
            .await
        {
            warn!(
                "Failed to remove consumed slot {} for doctor {}: {}",
                slot, request.doctor_id, e
            );
        }

        info!(
            "Appointment {} booked for patient {}",
            appointment.id, patient_id
        );
        Ok(appointment)
    }

    /// Confirm a CREATED appointment and dispatch the notification. The
    /// status guard is repeated in the update filter, so a concurrent
    /// transition makes the write a no-op instead of overwriting it.
    pub async fn confirm(&self, appointment_id: i64) -> Result<AppointmentDetail, AppointmentError> {
        let mut appointment = self.find_one(appointment_id).await?;

        if !appointment.status.can_confirm() {
            return Err(AppointmentError::InvalidStatusTransition(appointment.status));
        }

        let path = format!(
            "/appointments?id=eq.{}&status=eq.{}&select=id",
            appointment_id,
            AppointmentStatus::Created
        );
        let updated: Vec<serde_json::Value> = self
            .db
            .update(&path, json!({ "status": AppointmentStatus::Confirmed }))
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        if updated.is_empty() {
            return Err(AppointmentError::InvalidStatusTransition(appointment.status));
        }

        appointment.status = AppointmentStatus::Confirmed;
        info!("Appointment {} confirmed", appointment_id);

        // Fire-and-forget: the state change is durable, delivery is
        // best-effort and must never affect the result.
        let notifications = self.notifications.clone();
        let notice = AppointmentNotice {
            appointment_id: appointment.id,
            patient_name: appointment.patient_name.clone(),
            patient_email: appointment.patient_email.clone(),
            doctor_name: appointment.doctor_name.clone(),
            scheduled_at: appointment.scheduled_at,
            status: appointment.status.to_string(),
            notes: appointment.notes.clone(),
        };
        tokio::spawn(async move {
            notifications
                .send_appointment_notification(&notice, NotificationKind::Confirmation)
                .await;
        });

        Ok(appointment)
    }

    pub async fn find_all(
        &self,
        filter: AppointmentFilter,
    ) -> Result<Vec<AppointmentSummary>, AppointmentError> {
        debug!("Searching appointments with filters: {:?}", filter);

        let mut query_parts = Vec::new();

        if let Some(doctor_id) = filter.doctor_id {
            query_parts.push(format!("doctor_id=eq.{}", doctor_id));
        }
        if let Some(patient_id) = filter.patient_id {
            query_parts.push(format!("patient_id=eq.{}", patient_id));
        }
        if let Some(status) = filter.status {
            query_parts.push(format!("status=eq.{}", status));
        }
        if let Some(from) = filter.from {
            query_parts.push(format!(
                "scheduled_at=gte.{}",
                urlencoding::encode(&canonical_slot(from))
            ));
        }
        if let Some(to) = filter.to {
            query_parts.push(format!(
                "scheduled_at=lte.{}",
                urlencoding::encode(&canonical_slot(to))
            ));
        }

        query_parts.push(format!("select={}", SUMMARY_SELECT));
        query_parts.push("order=scheduled_at.desc".to_string());

        let path = format!("/appointments?{}", query_parts.join("&"));
        let rows: Vec<SummaryRow> = self
            .db
            .select(&path)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(SummaryRow::into_summary).collect())
    }

    pub async fn find_one(&self, appointment_id: i64) -> Result<AppointmentDetail, AppointmentError> {
        let path = format!(
            "/appointments?id=eq.{}&select={}&limit=1",
            appointment_id, DETAIL_SELECT
        );

        let row: Option<DetailRow> = self
            .db
            .select_one(&path)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        row.map(DetailRow::into_detail)
            .ok_or(AppointmentError::NotFound)
    }

    /// Non-cancelled appointment lookup for one side of the booking, by
    /// doctor or by patient column.
    async fn booked_at(&self, column: &str, id: i64, slot: &str) -> Result<bool, AppointmentError> {
        let path = format!(
            "/appointments?{}=eq.{}&scheduled_at=eq.{}&status=neq.{}&select=id&limit=1",
            column,
            id,
            urlencoding::encode(slot),
            AppointmentStatus::Cancelled
        );

        let rows: Vec<serde_json::Value> = self
            .db
            .select(&path)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        Ok(!rows.is_empty())
    }
}
