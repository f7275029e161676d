use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

use shared_cache::CacheService;
use shared_database::PostgrestClient;
use shared_models::auth::Role;
use shared_state::AppState;
use shared_utils::password::hash_password;

use crate::models::{CreateDoctorRequest, Doctor, DoctorError, DoctorSummary};
use crate::services::availability::{canonical_slot, future_slots};

const DOCTORS_LIST_TTL: Duration = Duration::from_secs(60 * 5);
const ALL_DOCTORS_CACHE_KEY: &str = "doctors:all";

const DOCTOR_COLUMNS: &str = "id,name,specialty,is_active,available_slots";
const SUMMARY_COLUMNS: &str = "id,name,specialty,is_active";

pub struct DoctorService {
    db: PostgrestClient,
    cache: CacheService,
}

impl DoctorService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
            cache: state.cache.clone(),
        }
    }

    pub async fn create(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        debug!("Creating doctor: {}", request.email);

        let password_hash =
            hash_password(&request.password).map_err(|e| DoctorError::Credential(e.to_string()))?;

        let slots: Vec<String> = request
            .available_slots
            .iter()
            .map(|ts| canonical_slot(*ts))
            .collect();

        let doctor_data = json!({
            "name": request.name,
            "email": request.email,
            "password_hash": password_hash,
            "specialty": request.specialty,
            "available_slots": slots,
            "is_active": true,
            "role": Role::Doctor,
        });

        let created: Doctor = self
            .db
            .insert(&format!("/doctors?select={}", DOCTOR_COLUMNS), doctor_data)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        // The list cache is now stale; a failed invalidation only delays
        // visibility until the TTL runs out.
        if self.cache.delete(ALL_DOCTORS_CACHE_KEY).await {
            info!("Invalidated cache key: {}", ALL_DOCTORS_CACHE_KEY);
        }

        info!("Doctor {} created", created.id);
        Ok(created)
    }

    /// Doctor list, served read-through from the cache with a short TTL.
    pub async fn find_all(&self) -> Result<Vec<DoctorSummary>, DoctorError> {
        if let Some(cached) = self
            .cache
            .get_json::<Vec<DoctorSummary>>(ALL_DOCTORS_CACHE_KEY)
            .await
        {
            debug!("Returning doctors list from cache");
            return Ok(cached);
        }

        let path = format!("/doctors?select={}&order=id.asc", SUMMARY_COLUMNS);
        let doctors: Vec<DoctorSummary> = self
            .db
            .select(&path)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        self.cache
            .set_json(ALL_DOCTORS_CACHE_KEY, &doctors, DOCTORS_LIST_TTL)
            .await;
        debug!("Doctor list stored in cache");

        Ok(doctors)
    }

    /// Single doctor with only the slots that are still in the future. Past
    /// slots are filtered at read time, never deleted.
    pub async fn find_by_id(&self, doctor_id: i64) -> Result<Doctor, DoctorError> {
        let path = format!(
            "/doctors?id=eq.{}&select={}&limit=1",
            doctor_id, DOCTOR_COLUMNS
        );

        let mut doctor: Doctor = self
            .db
            .select_one(&path)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?
            .ok_or(DoctorError::NotFound)?;

        doctor.available_slots = future_slots(doctor.available_slots, Utc::now());

        Ok(doctor)
    }
}
