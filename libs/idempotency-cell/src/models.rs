use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response snapshot stored under an idempotency key. Written once on the
/// first successful response and replayed verbatim for every duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    pub status: u16,
    pub data: Value,
}
