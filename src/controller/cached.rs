use super::operation::Operation;
use super::stats::{AtomicStats, CacheStats};
use crate::config::CacheConfig;
use crate::key::{CacheKey, CallArgs, KeyDeriver};
use crate::store::{CacheStore, RedisStore, StoreError};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error as ThisError;
use tracing::{info, warn};

/// Why a call skipped the cache and computed directly.
#[derive(Debug, ThisError)]
enum Fallback {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("stored entry is not decodable: {0}")]
    Undecodable(serde_json::Error),

    #[error("entry disappeared between exists and get")]
    Vanished,
}

enum Lookup<T> {
    Hit(T),
    Miss,
    Bypass { removed: bool },
}

/// Cache-aside wrapper around an [`Operation`].
///
/// Per call: derive the key, ask the store whether it exists, then either
/// return the stored value, invalidate it (bypass), or compute and store.
/// Store faults never reach the caller; the operation is computed directly
/// instead. Errors from the operation itself are returned unchanged.
///
/// A bypass call deletes an existing entry and computes; when no entry
/// exists it computes without writing, so bypass never seeds the cache.
///
/// Concurrent callers that miss on the same key each compute and each write;
/// the last write wins.
pub struct Cached<O: Operation> {
    operation: O,
    store: Arc<dyn CacheStore>,
    deriver: KeyDeriver,
    qualified_name: String,
    ttl: Duration,
    stats: AtomicStats,
}

impl<O: Operation> Cached<O> {
    pub fn new(operation: O, store: Arc<dyn CacheStore>, config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        let mut deriver = KeyDeriver::new();
        if let Some(ref prefix) = config.key_prefix {
            deriver = deriver.with_prefix(prefix.clone());
        }
        let qualified_name = operation.id().qualified_name();
        info!(
            operation = qualified_name.as_str(),
            store = store.name(),
            ttl_ms = config.ttl.as_millis() as u64,
            "cached operation ready"
        );
        Ok(Self {
            operation,
            store,
            deriver,
            qualified_name,
            ttl: config.ttl,
            stats: AtomicStats::default(),
        })
    }

    /// Wrap `operation` with a Redis store built from `config.store`.
    pub fn connect(operation: O, config: &CacheConfig) -> Result<Self> {
        let store = RedisStore::new(&config.store)?;
        Self::new(operation, Arc::new(store), config)
    }

    pub fn operation(&self) -> &O {
        &self.operation
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }

    pub fn key_for(&self, args: &CallArgs) -> Result<CacheKey> {
        self.deriver.derive(&self.qualified_name, args)
    }

    /// Delete the entry for `args`. Returns whether one existed.
    pub async fn invalidate(&self, args: &CallArgs) -> Result<bool> {
        let key = self.key_for(args)?;
        Ok(self.store.delete(key.as_str()).await?)
    }

    pub async fn invoke(&self, args: &CallArgs) -> std::result::Result<O::Output, O::Error> {
        let key = self.key_for(args)?;
        let bypass = args.is_bypass();

        match self.lookup(&key, bypass).await {
            Ok(Lookup::Hit(value)) => {
                AtomicStats::incr(&self.stats.hits);
                info!(cache_key = key.as_str(), "returning cached value");
                Ok(value)
            }
            Ok(Lookup::Bypass { removed }) => {
                AtomicStats::incr(&self.stats.bypasses);
                warn!(
                    cache_key = key.as_str(),
                    removed, "no_cache set: bypassing cache"
                );
                self.operation.call(args).await
            }
            Ok(Lookup::Miss) => {
                AtomicStats::incr(&self.stats.misses);
                info!(cache_key = key.as_str(), "no key found, computing");
                let value = self.operation.call(args).await?;
                self.write_back(&key, &value).await?;
                Ok(value)
            }
            Err(reason) => {
                AtomicStats::incr(&self.stats.fallbacks);
                warn!(
                    cache_key = key.as_str(),
                    store = self.store.name(),
                    error = %reason,
                    "store unavailable, computing directly without caching"
                );
                self.operation.call(args).await
            }
        }
    }

    async fn lookup(
        &self,
        key: &CacheKey,
        bypass: bool,
    ) -> std::result::Result<Lookup<O::Output>, Fallback> {
        let exists = self.store.exists(key.as_str()).await?;
        if bypass {
            let removed = exists && self.store.delete(key.as_str()).await?;
            return Ok(Lookup::Bypass { removed });
        }
        if !exists {
            return Ok(Lookup::Miss);
        }

        info!(cache_key = key.as_str(), "found an active key");
        let bytes = self
            .store
            .get(key.as_str())
            .await?
            .ok_or(Fallback::Vanished)?;
        serde_json::from_slice(&bytes)
            .map(Lookup::Hit)
            .map_err(Fallback::Undecodable)
    }

    /// A result that cannot be serialized is an error; a store that refuses
    /// the write is not.
    async fn write_back(&self, key: &CacheKey, value: &O::Output) -> Result<()> {
        let bytes = serde_json::to_vec(value).map_err(|e| {
            Error::serialization_with_context(
                e.to_string(),
                crate::ErrorContext::new()
                    .with_field_path("result")
                    .with_source("controller")
                    .with_details(self.qualified_name.clone()),
            )
        })?;
        if let Err(e) = self.store.set(key.as_str(), &bytes, self.ttl).await {
            AtomicStats::incr(&self.stats.write_failures);
            warn!(
                cache_key = key.as_str(),
                store = self.store.name(),
                error = %e,
                "can't cache computed value"
            );
        }
        Ok(())
    }
}
