//! # Cache-Aside Controller
//!
//! [`Cached`] runs the lookup / compute / store / bypass / fallback protocol
//! around one call to a wrapped [`Operation`].
//!
//! | Outcome | When | Store effect |
//! |---------|------|--------------|
//! | hit | entry exists, no bypass | read |
//! | miss | no entry | computed result written with the TTL |
//! | bypass | `no_cache = true` | existing entry deleted, nothing written |
//! | fallback | any store fault or undecodable entry | none |
//!
//! ```rust,no_run
//! use cache_aside::{from_fn, CacheConfig, Cached, CallArgs, OperationId};
//!
//! #[tokio::main]
//! async fn main() -> cache_aside::Result<()> {
//!     let add = from_fn(OperationId::new("mymodule", "add"), |args: CallArgs| async move {
//!         let a = args.get(0).and_then(|v| v.as_i64()).unwrap_or(0);
//!         let b = args.get(1).and_then(|v| v.as_i64()).unwrap_or(0);
//!         Ok::<_, cache_aside::Error>(a + b)
//!     });
//!     let config = CacheConfig::new().with_ttl_seconds(60).with_key_prefix("math");
//!     let cached = Cached::connect(add, &config)?;
//!
//!     let five = cached.invoke(&CallArgs::new().arg(2).arg(3)).await?;
//!     assert_eq!(five, 5);
//!     Ok(())
//! }
//! ```

mod cached;
mod operation;
mod stats;

pub use cached::Cached;
pub use operation::{from_fn, FnOperation, Operation, OperationId};
pub use stats::CacheStats;
