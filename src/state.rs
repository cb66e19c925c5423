//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use sqlx::PgPool;

use crate::config::Config;
use crate::db::Models;
use crate::middleware::RateLimiter;
use crate::templates::Templates;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    pool: PgPool,
    models: Models,
    templates: Templates,
    rate_limiter: RateLimiter,
    started: Instant,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool, templates: Templates) -> Self {
        let models = Models::new(pool.clone(), config.db.query_timeout);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                models,
                templates,
                rate_limiter: RateLimiter::default(),
                started: Instant::now(),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    pub fn models(&self) -> &Models {
        &self.inner.models
    }

    pub fn templates(&self) -> &Templates {
        &self.inner.templates
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.inner.rate_limiter
    }

    pub fn started(&self) -> Instant {
        self.inner.started
    }
}
