use super::{CacheStore, StoreError, StoreResult};
use crate::config::StoreConfig;
use crate::{Error, ErrorContext};
use async_trait::async_trait;
use deadpool_redis::{Config, Pool, PoolConfig, PoolError, Runtime, Timeouts};
use redis::{Cmd, ErrorKind, FromRedisValue, RedisError};
use std::time::Duration;

impl From<RedisError> for StoreError {
    fn from(e: RedisError) -> Self {
        let message = e.to_string();
        if e.kind() == ErrorKind::AuthenticationFailed {
            StoreError::Authentication(message)
        } else if e.is_timeout() {
            StoreError::Timeout(message)
        } else if e.is_connection_refusal() || e.is_connection_dropped() || e.is_io_error() {
            StoreError::Connection(message)
        } else {
            StoreError::Command(message)
        }
    }
}

impl From<PoolError> for StoreError {
    fn from(e: PoolError) -> Self {
        match e {
            PoolError::Backend(e) => StoreError::from(e),
            PoolError::Timeout(kind) => {
                StoreError::Timeout(format!("connection pool {:?} timed out", kind))
            }
            other => StoreError::Connection(other.to_string()),
        }
    }
}

/// Redis-backed store.
///
/// Opening the store does not touch the network. Connections are created by
/// a pool on demand, each attempt bounded by the configured timeout, so
/// concurrent callers against a hung server do not queue behind one another.
pub struct RedisStore {
    pool: Pool,
    timeout: Duration,
    target: String,
}

impl RedisStore {
    pub fn new(config: &StoreConfig) -> crate::Result<Self> {
        let ctx = || ErrorContext::new().with_field_path("store").with_source("redis_store");
        let url = config.url()?;

        let mut timeouts = Timeouts::default();
        timeouts.wait = Some(config.timeout);
        timeouts.create = Some(config.timeout);
        timeouts.recycle = Some(config.timeout);
        let mut pool_config = PoolConfig::new(config.pool_size.max(1));
        pool_config.timeouts = timeouts;

        let mut cfg = Config::from_url(url.as_str());
        cfg.pool = Some(pool_config);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| Error::configuration_with_context(e.to_string(), ctx()))?;

        Ok(Self {
            pool,
            timeout: config.timeout,
            target: format!("{}:{}/{}", config.url_host(), config.port, config.database),
        })
    }

    /// `host:port/db`, without credentials.
    pub fn target(&self) -> &str {
        &self.target
    }

    async fn run<T: FromRedisValue>(&self, cmd: Cmd) -> StoreResult<T> {
        let mut conn = self.pool.get().await?;
        match tokio::time::timeout(self.timeout, cmd.query_async::<_, T>(&mut conn)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StoreError::Timeout(format!(
                "command on {} took longer than {:?}",
                self.target, self.timeout
            ))),
        }
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn exists(&self, key: &str) -> StoreResult<bool> {
        self.run(redis::cmd("EXISTS").arg(key).clone()).await
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.run(redis::cmd("GET").arg(key).clone()).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<()> {
        // PX keeps sub-second TTLs; Redis rejects an expiry of zero.
        let ttl_ms = (ttl.as_millis() as u64).max(1);
        self.run(redis::cmd("SET").arg(key).arg(value).arg("PX").arg(ttl_ms).clone())
            .await
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let removed: i64 = self.run(redis::cmd("DEL").arg(key).clone()).await?;
        Ok(removed > 0)
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_does_not_connect() {
        let store = RedisStore::new(&StoreConfig::new().with_host("127.0.0.1").with_port(1)).unwrap();
        assert_eq!(store.target(), "127.0.0.1:1/0");
        assert_eq!(store.name(), "redis");
    }

    #[test]
    fn test_ipv6_target() {
        let store = RedisStore::new(&StoreConfig::new().with_host("::1")).unwrap();
        assert_eq!(store.target(), "[::1]:6379/0");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_or_timeout() {
        let config = StoreConfig::new()
            .with_host("127.0.0.1")
            .with_port(1)
            .with_timeout(Duration::from_millis(300));
        let store = RedisStore::new(&config).unwrap();
        let err = store.exists("k").await.unwrap_err();
        assert!(
            matches!(err, StoreError::Connection(_) | StoreError::Timeout(_)),
            "unexpected error: {:?}",
            err
        );
    }
}
