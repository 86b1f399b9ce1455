//! Wrap-time configuration.
//!
//! A [`CacheConfig`] is fixed when a cached operation is built; only the bypass
//! flag varies per call. Several wrappers with different configurations can
//! coexist since nothing here is global.

use crate::{Error, ErrorContext, Result};
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_STORE_HOST: &str = "localhost";
pub const DEFAULT_STORE_PORT: u16 = 6379;
pub const DEFAULT_TTL_SECS: u64 = 60;
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_STORE_POOL_SIZE: usize = 16;

/// Connection target of the backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    /// Logical database index.
    pub database: i64,
    /// ACL user; `None` authenticates as the default user.
    pub username: Option<String>,
    pub password: Option<String>,
    /// Bound on connection setup and on each store command.
    pub timeout: Duration,
    /// Upper bound on open connections.
    pub pool_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_STORE_HOST.to_string(),
            port: DEFAULT_STORE_PORT,
            database: 0,
            username: None,
            password: None,
            timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            pool_size: DEFAULT_STORE_POOL_SIZE,
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_database(mut self, database: i64) -> Self {
        self.database = database;
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Host as it appears in a URL authority; IPv6 literals are bracketed.
    pub fn url_host(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }

    /// Parse `redis://[[user]:password@]host[:port][/db]`.
    pub fn from_url(raw: &str) -> Result<Self> {
        let ctx = || ErrorContext::new().with_field_path("store.url").with_source("config");
        let url = Url::parse(raw)
            .map_err(|e| Error::configuration_with_context(e.to_string(), ctx()))?;
        if url.scheme() != "redis" {
            return Err(Error::configuration_with_context(
                format!("unsupported store scheme '{}'", url.scheme()),
                ctx(),
            ));
        }
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::configuration_with_context("store url has no host", ctx()))?;
        let db_segment = url.path().trim_start_matches('/');
        let database = if db_segment.is_empty() {
            0
        } else {
            db_segment.parse::<i64>().map_err(|_| {
                Error::configuration_with_context(
                    "store database must be an integer",
                    ctx().with_details(db_segment.to_string()),
                )
            })?
        };
        let host = host.trim_start_matches('[').trim_end_matches(']');
        Ok(Self {
            host: host.to_string(),
            port: url.port().unwrap_or(DEFAULT_STORE_PORT),
            database,
            username: Some(url.username())
                .filter(|u| !u.is_empty())
                .map(str::to_string),
            password: url.password().map(str::to_string),
            ..Self::default()
        })
    }

    /// Connection URL understood by the Redis client.
    pub fn url(&self) -> Result<Url> {
        let ctx = || ErrorContext::new().with_field_path("store.host").with_source("config");
        let mut url = Url::parse(&format!(
            "redis://{}:{}/{}",
            self.url_host(),
            self.port,
            self.database
        ))
        .map_err(|e| Error::configuration_with_context(e.to_string(), ctx()))?;
        if let Some(ref username) = self.username {
            url.set_username(username).map_err(|_| {
                Error::configuration_with_context("cannot attach username to store url", ctx())
            })?;
        }
        if let Some(ref password) = self.password {
            url.set_password(Some(password)).map_err(|_| {
                Error::configuration_with_context("cannot attach password to store url", ctx())
            })?;
        }
        Ok(url)
    }
}

/// Configuration of one cached operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub store: StoreConfig,
    /// Time-to-live of new entries; expiry itself is the store's job.
    pub ttl: Duration,
    pub key_prefix: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            key_prefix: None,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_ttl_seconds(self, secs: u64) -> Self {
        self.with_ttl(Duration::from_secs(secs))
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(Error::configuration_with_context(
                "ttl must be greater than zero",
                ErrorContext::new().with_field_path("ttl").with_source("config"),
            ));
        }
        if self.store.pool_size == 0 {
            return Err(Error::configuration_with_context(
                "store pool size must be greater than zero",
                ErrorContext::new().with_field_path("store.pool_size").with_source("config"),
            ));
        }
        if self.store.host.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "store host must not be empty",
                ErrorContext::new().with_field_path("store.host").with_source("config"),
            ));
        }
        Ok(())
    }

    /// Load from the process environment.
    ///
    /// `CACHE_STORE_URL` takes precedence over `CACHE_STORE_HOST`,
    /// `CACHE_STORE_PORT` and `CACHE_STORE_DB`. Unparsable numbers keep their
    /// defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut store = match lookup("CACHE_STORE_URL") {
            Some(url) => StoreConfig::from_url(&url)?,
            None => {
                let mut store = StoreConfig::default();
                if let Some(host) = lookup("CACHE_STORE_HOST") {
                    store.host = host;
                }
                if let Some(port) = lookup("CACHE_STORE_PORT").and_then(|s| s.parse().ok()) {
                    store.port = port;
                }
                if let Some(db) = lookup("CACHE_STORE_DB").and_then(|s| s.parse().ok()) {
                    store.database = db;
                }
                store
            }
        };
        if let Some(username) = lookup("CACHE_STORE_USERNAME") {
            store.username = Some(username);
        }
        if let Some(password) = lookup("CACHE_STORE_PASSWORD") {
            store.password = Some(password);
        }
        if let Some(ms) = lookup("CACHE_STORE_TIMEOUT_MS").and_then(|s| s.parse::<u64>().ok()) {
            store.timeout = Duration::from_millis(ms);
        }
        if let Some(size) = lookup("CACHE_STORE_POOL_SIZE").and_then(|s| s.parse::<usize>().ok()) {
            store.pool_size = size;
        }

        let ttl = lookup("CACHE_TTL_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TTL_SECS));

        let config = Self {
            store,
            ttl,
            key_prefix: lookup("CACHE_KEY_PREFIX").filter(|p| !p.is_empty()),
        };
        config.validate()?;
        Ok(config)
    }
}
