//! Cache key derivation.

use super::args::CallArgs;
use super::canonical;
use crate::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub key: String,
    pub operation: String,
    pub digest: String,
}

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

/// Derive the key `{prefix}_cache_{operation}.{sha256-hex}` for one call.
///
/// The bypass keyword never contributes to the digest.
pub fn derive(prefix: Option<&str>, operation: &str, args: &CallArgs) -> Result<CacheKey> {
    let material = canonical::encode_call(args)?;
    let mut hasher = Sha256::new();
    hasher.update(&material);
    let digest: String = hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect();
    Ok(CacheKey {
        key: format!("{}_cache_{}.{}", prefix.unwrap_or(""), operation, digest),
        operation: operation.to_string(),
        digest,
    })
}

/// Key deriver bound to one key prefix.
#[derive(Debug, Clone, Default)]
pub struct KeyDeriver {
    prefix: Option<String>,
}

impl KeyDeriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn derive(&self, operation: &str, args: &CallArgs) -> Result<CacheKey> {
        derive(self.prefix.as_deref(), operation, args)
    }
}
