pub mod service;
pub mod store;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use service::CacheService;
pub use store::{MemoryStore, RedisStore};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache pool error: {0}")]
    Pool(String),

    #[error("cache backend error: {0}")]
    Backend(#[from] redis::RedisError),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Backing store for the key-value cache. Implementations persist opaque
/// string payloads with an expiry and are the only place TTL eviction
/// happens.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Returns true when the key existed and was removed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;
}
