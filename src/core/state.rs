use std::sync::Arc;

use sqlx::PgPool;

use crate::core::{config::Settings, redis::RedisHandle};
use crate::services::email::EmailService;
use crate::services::google::GoogleVerifier;
use crate::services::storage::StorageService;

/// Optional integrations. Each one is absent when its configuration is missing.
#[derive(Clone, Default)]
pub(crate) struct Integrations {
    pub(crate) storage: Option<StorageService>,
    pub(crate) email: Option<EmailService>,
    pub(crate) google: Option<GoogleVerifier>,
}

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    redis: RedisHandle,
    integrations: Integrations,
}

impl AppState {
    pub(crate) fn new(
        settings: Settings,
        db: PgPool,
        redis: RedisHandle,
        integrations: Integrations,
    ) -> Self {
        Self { inner: Arc::new(InnerState { settings, db, redis, integrations }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn redis(&self) -> &RedisHandle {
        &self.inner.redis
    }

    pub(crate) fn storage(&self) -> Option<&StorageService> {
        self.inner.integrations.storage.as_ref()
    }

    pub(crate) fn email(&self) -> Option<&EmailService> {
        self.inner.integrations.email.as_ref()
    }

    pub(crate) fn google(&self) -> Option<&GoogleVerifier> {
        self.inner.integrations.google.as_ref()
    }
}
