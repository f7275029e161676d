use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use shared_database::PostgrestClient;
use shared_state::AppState;

use crate::models::DoctorError;

/// Canonical instant representation used for slot membership tests: RFC3339
/// in UTC, whole seconds, `Z` suffix. All comparisons against the stored
/// slot collection go through this normalization.
pub fn canonical_slot(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Keep only slots strictly in the future. Entries that fail to parse are
/// dropped rather than surfaced.
pub fn future_slots(slots: Vec<String>, now: DateTime<Utc>) -> Vec<String> {
    slots
        .into_iter()
        .filter(|slot| match DateTime::parse_from_rfc3339(slot) {
            Ok(ts) => ts.with_timezone(&Utc) > now,
            Err(_) => false,
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct SlotsRow {
    available_slots: Vec<String>,
}

/// Per-doctor open-slot collection, stored as an array column on the
/// doctors table. No locking happens here: double-booking protection comes
/// from the appointments unique indexes, not from this store.
pub struct AvailabilityStore {
    db: PostgrestClient,
}

impl AvailabilityStore {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    /// Exact-match containment test against the stored collection.
    pub async fn slot_exists(
        &self,
        doctor_id: i64,
        ts: DateTime<Utc>,
    ) -> Result<bool, DoctorError> {
        let slot = canonical_slot(ts);
        let contains = urlencoding::encode(&format!("{{\"{}\"}}", slot)).into_owned();
        let path = format!(
            "/doctors?id=eq.{}&available_slots=cs.{}&select=id&limit=1",
            doctor_id, contains
        );

        let rows: Vec<serde_json::Value> = self
            .db
            .select(&path)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        Ok(!rows.is_empty())
    }

    /// Delete the exact matching entry. Removing a slot that is not present
    /// (or belongs to an unknown doctor) is a no-op, not an error.
    pub async fn remove_slot(&self, doctor_id: i64, ts: DateTime<Utc>) -> Result<(), DoctorError> {
        let slot = canonical_slot(ts);

        let read_path = format!(
            "/doctors?id=eq.{}&select=available_slots&limit=1",
            doctor_id
        );
        let row: Option<SlotsRow> = self
            .db
            .select_one(&read_path)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let Some(row) = row else {
            return Ok(());
        };

        let remaining: Vec<String> = row
            .available_slots
            .into_iter()
            .filter(|existing| *existing != slot)
            .collect();

        debug!(
            "Removing slot {} from doctor {} ({} slots remain)",
            slot,
            doctor_id,
            remaining.len()
        );

        let update_path = format!("/doctors?id=eq.{}&select=id", doctor_id);
        let _: Vec<serde_json::Value> = self
            .db
            .update(&update_path, json!({ "available_slots": remaining }))
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn canonical_slot_truncates_to_whole_seconds() {
        let ts = Utc.with_ymd_and_hms(2025, 10, 28, 9, 0, 0).unwrap()
            + chrono::Duration::milliseconds(450);
        assert_eq!(canonical_slot(ts), "2025-10-28T09:00:00Z");
    }

    #[test]
    fn canonical_slot_normalizes_offsets_to_utc() {
        let ts = DateTime::parse_from_rfc3339("2025-10-28T10:00:00+01:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(canonical_slot(ts), "2025-10-28T09:00:00Z");
    }

    #[test]
    fn future_slots_drops_past_and_unparsable_entries() {
        let now = Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap();
        let slots = vec![
            "2025-09-30T09:00:00Z".to_string(),
            "2025-10-28T09:00:00Z".to_string(),
            "not-a-timestamp".to_string(),
            "2025-10-01T12:00:00Z".to_string(),
        ];

        let kept = future_slots(slots, now);
        assert_eq!(kept, vec!["2025-10-28T09:00:00Z".to_string()]);
    }
}
