use shared_cache::CacheService;
use shared_config::AppConfig;
use shared_database::PostgrestClient;

/// Process-wide dependencies, constructed once at startup and passed into
/// every cell. Owns the data API client and the cache handle for the whole
/// process lifecycle.
pub struct AppState {
    pub config: AppConfig,
    pub db: PostgrestClient,
    pub cache: CacheService,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let db = PostgrestClient::new(&config);
        let cache = CacheService::from_config(&config);

        Self { config, db, cache }
    }

    /// Assemble state from pre-built parts; used by tests to point the data
    /// API client at a mock server and the cache at an in-process store.
    pub fn with_parts(config: AppConfig, db: PostgrestClient, cache: CacheService) -> Self {
        Self { config, db, cache }
    }
}
