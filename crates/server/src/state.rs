//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::services::reports::CachedReport;
use crate::services::tokens::TokenService;

/// Shared application state, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    tokens: TokenService,
    report_cache: Cache<String, CachedReport>,
}

impl AppState {
    /// Build the state: token service from the JWT config, report cache
    /// with the configured TTL.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let tokens = TokenService::new(&config.jwt);
        let report_cache = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(Duration::from_secs(config.report_cache_ttl_minutes * 60))
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                report_cache,
            }),
        }
    }

    /// Server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Token issuance and verification service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// Shared report payload cache.
    #[must_use]
    pub fn report_cache(&self) -> &Cache<String, CachedReport> {
        &self.inner.report_cache
    }
}
