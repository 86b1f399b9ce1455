//! Cached `add` Example
//!
//! Walks through the cache-aside lifecycle against Redis:
//! - first call computes and stores
//! - second call is served from Redis
//! - `no_cache` forces a fresh computation and drops the entry
//!
//! With no Redis listening every call is computed directly and a fallback
//! warning is logged.
//!
//! Usage:
//!   CACHE_STORE_URL=redis://127.0.0.1:6379/0 RUST_LOG=info cargo run --example cached_add

use cache_aside::{from_fn, CacheConfig, Cached, CallArgs, OperationId};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?),
        )
        .init();

    let config = CacheConfig::from_env()?.with_key_prefix("math");

    let add = from_fn(OperationId::new("mymodule", "add"), |args: CallArgs| async move {
        // stand-in for an expensive computation
        tokio::time::sleep(Duration::from_millis(200)).await;
        let a = args.get(0).and_then(|v| v.as_i64()).unwrap_or(0);
        let b = args.get(1).and_then(|v| v.as_i64()).unwrap_or(0);
        Ok::<_, cache_aside::Error>(a + b)
    });
    let cached = Cached::connect(add, &config)?;

    let args = CallArgs::new().arg(2).arg(3);
    println!("key: {}", cached.key_for(&args)?);

    for label in ["first call", "second call"] {
        let start = std::time::Instant::now();
        let sum = cached.invoke(&args).await?;
        println!("{}: {} ({} ms)", label, sum, start.elapsed().as_millis());
    }

    let sum = cached.invoke(&args.clone().bypass(true)).await?;
    println!("bypass: {}", sum);

    let stats = cached.stats();
    println!(
        "hits={} misses={} bypasses={} fallbacks={} hit_ratio={:.2}",
        stats.hits,
        stats.misses,
        stats.bypasses,
        stats.fallbacks,
        stats.hit_ratio()
    );
    Ok(())
}
