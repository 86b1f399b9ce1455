//! # Key Deriver
//!
//! Computes the cache key of a call from the operation's qualified name, the
//! positional arguments and the keyword arguments.
//!
//! Arguments are restricted to [`ArgValue`], a closed value model with a
//! versioned canonical byte encoding (see [`canonical`]). The encoding never
//! depends on memory addresses or hash-map iteration order, so the same call
//! yields the same key in every process.
//!
//! ```rust
//! use cache_aside::key::{derive, CallArgs};
//!
//! let key = derive(Some("math"), "mymodule.add", &CallArgs::new().arg(2).arg(3)).unwrap();
//! assert!(key.as_str().starts_with("math_cache_mymodule.add."));
//! ```
//!
//! The reserved keyword [`BYPASS_KEYWORD`] is excluded from the hashed
//! material: a call with and without bypass addresses the same entry.

mod args;
pub mod canonical;
mod deriver;

pub use args::{ArgValue, CallArgs, BYPASS_KEYWORD};
pub use deriver::{derive, CacheKey, KeyDeriver};
