use std::sync::Arc;

use shared_cache::CacheService;
use shared_config::AppConfig;
use shared_database::PostgrestClient;
use shared_models::auth::{AuthUser, Role};
use shared_state::AppState;

use crate::jwt::sign_token;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";

pub struct TestConfig {
    pub jwt_secret: String,
    pub database_api_url: String,
    pub database_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            database_api_url: "http://localhost:54321".to_string(),
            database_api_key: "test-api-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_database_url(url: &str) -> Self {
        Self {
            database_api_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            database_api_url: self.database_api_url.clone(),
            database_api_key: self.database_api_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            redis_url: None,
            bind_port: 3000,
        }
    }
}

/// App state wired to a mock data API server and an in-process cache.
pub fn test_state(database_api_url: &str) -> Arc<AppState> {
    let config = TestConfig::with_database_url(database_api_url).to_app_config();
    let db = PostgrestClient::new(&config);
    Arc::new(AppState::with_parts(config, db, CacheService::in_memory()))
}

pub fn test_patient(id: i64) -> AuthUser {
    AuthUser {
        id,
        email: format!("patient{}@example.com", id),
        role: Role::Patient,
    }
}

pub fn test_admin(id: i64) -> AuthUser {
    AuthUser {
        id,
        email: format!("admin{}@example.com", id),
        role: Role::Admin,
    }
}

pub fn test_token(user: &AuthUser) -> String {
    sign_token(user, TEST_JWT_SECRET).expect("failed to sign test token")
}
