use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info, warn};

use shared_config::AppConfig;

use crate::store::{MemoryStore, RedisStore};
use crate::KeyValueStore;

/// Best-effort JSON cache over a [`KeyValueStore`]. Every backend failure is
/// caught and logged here so callers always observe a miss or a no-op,
/// never an error: this layer is an accelerator and a dedup ledger, not a
/// source of truth for domain state.
#[derive(Clone)]
pub struct CacheService {
    store: Arc<dyn KeyValueStore>,
}

impl CacheService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn from_config(config: &AppConfig) -> Self {
        match &config.redis_url {
            Some(url) => match RedisStore::new(url) {
                Ok(store) => Self::new(Arc::new(store)),
                Err(e) => {
                    warn!("Failed to build redis cache pool ({}), falling back to in-process cache", e);
                    Self::in_memory()
                }
            },
            None => {
                info!("REDIS_URL not set, using in-process cache");
                Self::in_memory()
            }
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let serialized = match serde_json::to_string(value) {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to serialize cache value for {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.store.set(key, serialized, ttl).await {
            error!("Failed to set cache key {}: {}", key, e);
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let cached = match self.store.get(key).await {
            Ok(value) => value?,
            Err(e) => {
                error!("Failed to read cache key {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&cached) {
            Ok(value) => Some(value),
            Err(e) => {
                error!("Failed to parse cached value for {}: {}", key, e);
                None
            }
        }
    }

    pub async fn delete(&self, key: &str) -> bool {
        match self.store.delete(key).await {
            Ok(deleted) => deleted,
            Err(e) => {
                error!("Failed to delete cache key {}: {}", key, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::CacheError;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        status: u16,
        message: String,
    }

    struct FailingStore;

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Pool("store unavailable".to_string()))
        }

        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Pool("store unavailable".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<bool, CacheError> {
            Err(CacheError::Pool("store unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn json_roundtrip() {
        let cache = CacheService::in_memory();
        let payload = Payload {
            status: 201,
            message: "created".to_string(),
        };

        cache.set_json("k", &payload, Duration::from_secs(60)).await;
        let loaded: Option<Payload> = cache.get_json("k").await;
        assert_eq!(loaded, Some(payload));

        assert!(cache.delete("k").await);
        let gone: Option<Payload> = cache.get_json("k").await;
        assert_eq!(gone, None);
    }

    #[tokio::test]
    async fn backend_failure_degrades_to_miss() {
        let cache = CacheService::new(Arc::new(FailingStore));
        let payload = Payload {
            status: 200,
            message: "ok".to_string(),
        };

        // None of these may propagate the backend failure.
        cache.set_json("k", &payload, Duration::from_secs(60)).await;
        let loaded: Option<Payload> = cache.get_json("k").await;
        assert_eq!(loaded, None);
        assert!(!cache.delete("k").await);
    }

    #[tokio::test]
    async fn corrupt_entry_reads_as_miss() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("k", "not-json".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        let cache = CacheService::new(store);
        let loaded: Option<Payload> = cache.get_json("k").await;
        assert_eq!(loaded, None);
    }
}
