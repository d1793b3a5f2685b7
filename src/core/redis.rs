use std::sync::Arc;

use redis::aio::ConnectionManager;
use redis::{cmd, Client, RedisError};
use tokio::sync::RwLock;

/// Fixed-window limit applied per key.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RateLimit {
    pub(crate) limit: u64,
    pub(crate) window_seconds: u64,
}

pub(crate) const AUTH_RATE_LIMIT: RateLimit = RateLimit { limit: 10, window_seconds: 60 };

const RATE_LIMIT_SCRIPT: &str = r#"
    local current = redis.call("INCR", KEYS[1])
    if current == 1 then
        redis.call("EXPIRE", KEYS[1], ARGV[1])
    end
    return current
"#;

#[derive(Clone)]
pub(crate) struct RedisHandle {
    url: String,
    manager: Arc<RwLock<Option<ConnectionManager>>>,
}

#[derive(Debug, Clone)]
pub(crate) enum RedisHealth {
    Healthy,
    Disconnected,
    Unhealthy(String),
}

impl RedisHandle {
    pub(crate) fn new(url: String) -> Self {
        Self { url, manager: Arc::new(RwLock::new(None)) }
    }

    pub(crate) async fn connect(&self) -> Result<(), RedisError> {
        let client = Client::open(self.url.clone())?;
        let manager = ConnectionManager::new(client).await?;
        *self.manager.write().await = Some(manager);
        Ok(())
    }

    pub(crate) async fn disconnect(&self) {
        *self.manager.write().await = None;
    }

    async fn manager(&self) -> Option<ConnectionManager> {
        self.manager.read().await.clone()
    }

    pub(crate) async fn health(&self) -> RedisHealth {
        let Some(mut manager) = self.manager().await else {
            return RedisHealth::Disconnected;
        };

        match cmd("PING").query_async::<_, String>(&mut manager).await {
            Ok(_) => RedisHealth::Healthy,
            Err(err) => RedisHealth::Unhealthy(err.to_string()),
        }
    }

    /// Counts one hit against `key`. Without a connection every request is allowed.
    pub(crate) async fn rate_limit(&self, key: &str, rule: RateLimit) -> Result<bool, RedisError> {
        let Some(mut manager) = self.manager().await else {
            return Ok(true);
        };

        let current: i64 = redis::Script::new(RATE_LIMIT_SCRIPT)
            .key(key)
            .arg(rule.window_seconds as i64)
            .invoke_async(&mut manager)
            .await?;

        Ok(current <= rule.limit as i64)
    }

    /// Like [`rate_limit`](Self::rate_limit) but fails open on Redis errors.
    pub(crate) async fn allow(&self, scope: &str, subject: &str, rule: RateLimit) -> bool {
        let key = format!("rl:{scope}:{}", subject.to_ascii_lowercase());
        match self.rate_limit(&key, rule).await {
            Ok(allowed) => allowed,
            Err(err) => {
                tracing::warn!(error = %err, scope, "Rate limiter unavailable");
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RateLimit, RedisHandle};
    use crate::core::config::Settings;
    use crate::test_support;
    use uuid::Uuid;

    #[tokio::test]
    async fn rate_limit_enforces_limit() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();

        let settings = Settings::load().expect("settings");
        test_support::reset_redis(settings.redis().redis_url()).await.expect("redis reset");

        let redis = RedisHandle::new(settings.redis().redis_url());
        redis.connect().await.expect("redis connect");

        let rule = RateLimit { limit: 2, window_seconds: 5 };
        let subject = Uuid::new_v4().to_string();
        assert!(redis.allow("login", &subject, rule).await);
        assert!(redis.allow("login", &subject, rule).await);
        assert!(!redis.allow("login", &subject, rule).await);
        assert!(redis.allow("register", &subject, rule).await);
    }

    #[tokio::test]
    async fn disconnected_handle_allows_everything() {
        let redis = RedisHandle::new("redis://127.0.0.1:1/0".to_string());
        let rule = RateLimit { limit: 0, window_seconds: 5 };
        assert!(redis.rate_limit("any", rule).await.expect("no connection"));
    }
}
