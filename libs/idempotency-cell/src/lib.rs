pub mod middleware;
pub mod models;
pub mod service;

pub use middleware::{idempotency_middleware, IDEMPOTENCY_KEY_HEADER};
pub use models::IdempotencyRecord;
pub use service::IdempotencyService;
