//! # Backing Stores
//!
//! The cache never manages storage or expiry itself; it talks to a key-value
//! store through [`CacheStore`].
//!
//! | Store | Description |
//! |-------|-------------|
//! | [`RedisStore`] | Redis through a lazily filled connection pool |
//! | [`MemoryStore`] | Process-local store with TTL expiry |
//!
//! Every store failure is reported as a [`StoreError`]. The controller treats
//! all of them as "store unavailable" and falls back to direct computation.

mod memory;
mod redis_store;

pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Store communication faults.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store timed out: {0}")]
    Timeout(String),

    #[error("store authentication failed: {0}")]
    Authentication(String),

    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("store command failed: {0}")]
    Command(String),
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Timeout(_) => "timeout",
            StoreError::Authentication(_) => "authentication",
            StoreError::Connection(_) => "connection",
            StoreError::Command(_) => "command",
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn exists(&self, key: &str) -> StoreResult<bool>;
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;
    /// Store `value` under `key`, to expire after `ttl`.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<()>;
    /// Returns whether an entry was removed.
    async fn delete(&self, key: &str) -> StoreResult<bool>;
    fn name(&self) -> &'static str;
}
