//! # cache-aside
//!
//! Transparent result caching for async computations, backed by Redis.
//!
//! ## Overview
//!
//! Wrap any [`Operation`] in a [`Cached`] controller. The first call for a given
//! identity (operation plus arguments) computes the result and stores it with a
//! time-to-live; later calls with the same identity return the stored result
//! until the store expires it. A call can force fresh computation with the
//! reserved `no_cache` keyword, which also invalidates the stored entry.
//!
//! The cache is transparent: when the store is unreachable, times out or
//! rejects authentication, calls are computed directly and the fault is only
//! logged. Errors raised by the wrapped operation always reach the caller.
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`key`] | Argument model, canonical encoding and cache key derivation |
//! | [`controller`] | The cache-aside protocol around one call |
//! | [`store`] | Backing store trait with Redis and in-memory implementations |
//! | [`config`] | Wrap-time configuration |
//!
//! ## Limitations
//!
//! There is no single-flight suppression: concurrent callers that miss on the
//! same key all compute, and the last write wins.

pub mod config;
pub mod controller;
pub mod key;
pub mod store;

pub use config::{CacheConfig, StoreConfig};
pub use controller::{from_fn, CacheStats, Cached, FnOperation, Operation, OperationId};
pub use key::{ArgValue, CacheKey, CallArgs, KeyDeriver, BYPASS_KEYWORD};
pub use store::{CacheStore, MemoryStore, RedisStore, StoreError};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
