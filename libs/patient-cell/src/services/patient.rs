use serde_json::json;
use tracing::{debug, info};

use shared_database::{DbError, PostgrestClient};
use shared_models::auth::Role;
use shared_state::AppState;
use shared_utils::password::hash_password;

use crate::models::{CreatePatientRequest, Patient, PatientError, PatientRecord};

const PATIENT_COLUMNS: &str = "id,name,email,birth_date,phone,role";

pub struct PatientService {
    db: PostgrestClient,
}

impl PatientService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    /// Register a new patient. The email is unique: a duplicate is rejected
    /// up front when visible, and the storage-level unique constraint
    /// catches the remaining race.
    pub async fn register(&self, request: CreatePatientRequest) -> Result<Patient, PatientError> {
        debug!("Registering patient: {}", request.email);

        let existing_path = format!("/patients?email=eq.{}&select=id&limit=1", request.email);
        let existing: Vec<serde_json::Value> = self
            .db
            .select(&existing_path)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        if !existing.is_empty() {
            return Err(PatientError::EmailTaken);
        }

        let password_hash =
            hash_password(&request.password).map_err(|e| PatientError::Credential(e.to_string()))?;

        let patient_data = json!({
            "name": request.name,
            "email": request.email,
            "password_hash": password_hash,
            "birth_date": request.birth_date,
            "phone": request.phone,
            "role": Role::Patient,
        });

        let created: Patient = self
            .db
            .insert(&format!("/patients?select={}", PATIENT_COLUMNS), patient_data)
            .await
            .map_err(|e| match e {
                DbError::UniqueViolation(_) => PatientError::EmailTaken,
                other => PatientError::Database(other.to_string()),
            })?;

        info!("Patient {} registered", created.id);
        Ok(created)
    }

    pub async fn find_by_id(&self, patient_id: i64) -> Result<Patient, PatientError> {
        let path = format!(
            "/patients?id=eq.{}&select={}&limit=1",
            patient_id, PATIENT_COLUMNS
        );

        self.db
            .select_one(&path)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?
            .ok_or(PatientError::NotFound)
    }

    /// Full record lookup for credential verification during login.
    pub async fn find_record_by_email(
        &self,
        email: &str,
    ) -> Result<Option<PatientRecord>, PatientError> {
        let path = format!("/patients?email=eq.{}&limit=1", email);

        self.db
            .select_one(&path)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))
    }
}
