//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::services::{EmailService, OrderService};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pool: PgPool,
    email: EmailService,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, pool: PgPool, email: EmailService) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                email,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }

    /// Order service bound to this state's pool, mailer and capacity.
    #[must_use]
    pub fn orders(&self) -> OrderService<'_> {
        OrderService::new(
            &self.inner.pool,
            &self.inner.email,
            self.inner.config.wedding_tasting_capacity,
        )
    }
}
