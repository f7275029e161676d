use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use shared_cache::CacheService;

use crate::models::IdempotencyRecord;

/// TTL for stored responses (24 hours).
const IDEMPOTENCY_KEY_TTL: Duration = Duration::from_secs(60 * 60 * 24);
const IDEMPOTENCY_PREFIX: &str = "idempotency:";

/// Maps a client-supplied idempotency key to the response of the request
/// that first carried it. Backed by the key-value cache, so every
/// operation is best-effort: a cache failure reads as a miss and only
/// risks one extra execution, never a failed request.
#[derive(Clone)]
pub struct IdempotencyService {
    cache: CacheService,
}

impl IdempotencyService {
    pub fn new(cache: CacheService) -> Self {
        Self { cache }
    }

    fn record_key(idempotency_key: &str) -> String {
        format!("{}{}", IDEMPOTENCY_PREFIX, idempotency_key)
    }

    pub async fn get_record(&self, key: &str) -> Option<IdempotencyRecord> {
        self.cache.get_json(&Self::record_key(key)).await
    }

    pub async fn save_record(&self, key: &str, status: u16, data: Value) {
        let record = IdempotencyRecord { status, data };
        self.cache
            .set_json(&Self::record_key(key), &record, IDEMPOTENCY_KEY_TTL)
            .await;
    }

    pub async fn delete_record(&self, key: &str) -> bool {
        let deleted = self.cache.delete(&Self::record_key(key)).await;
        debug!("Idempotency record {} deleted: {}", key, deleted);
        deleted
    }
}
