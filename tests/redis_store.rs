//! Integration tests against a live Redis.
//!
//! Requires a Redis server. Set REDIS_URL=redis://127.0.0.1:6379/15
//! and run with: cargo test --test redis_store -- --ignored --nocapture

mod support;

use cache_aside::{CacheConfig, CacheStore, Cached, CallArgs, RedisStore, StoreConfig};
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use support::{calls, counting_add};
use tokio::net::TcpListener;

fn redis_config() -> Option<StoreConfig> {
    let url = std::env::var("REDIS_URL").ok();
    if url.is_none() {
        eprintln!("REDIS_URL not set, skipping");
    }
    url.map(|u| StoreConfig::from_url(&u).expect("REDIS_URL must be a redis:// url"))
}

#[tokio::test]
#[ignore = "requires Redis; run with REDIS_URL set"]
async fn test_store_contract_on_redis() {
    let Some(config) = redis_config() else { return };
    let store = RedisStore::new(&config).unwrap();
    let key = "_cache_tests.contract.k";

    store.delete(key).await.unwrap();
    assert!(!store.exists(key).await.unwrap());
    store.set(key, b"payload", Duration::from_secs(30)).await.unwrap();
    assert!(store.exists(key).await.unwrap());
    assert_eq!(store.get(key).await.unwrap(), Some(b"payload".to_vec()));
    assert!(store.delete(key).await.unwrap());
    assert_eq!(store.get(key).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires Redis; run with REDIS_URL set"]
async fn test_ttl_expiry_on_redis() {
    let Some(config) = redis_config() else { return };
    let counter = Arc::new(AtomicUsize::new(0));
    let cached = Cached::connect(
        counting_add(counter.clone()),
        &CacheConfig::new()
            .with_store(config)
            .with_ttl(Duration::from_millis(300))
            .with_key_prefix("ttl-test"),
    )
    .unwrap();
    let args = CallArgs::new().arg(20).arg(22);
    cached.invalidate(&args).await.unwrap();

    assert_eq!(cached.invoke(&args).await.unwrap(), 42);
    assert_eq!(cached.invoke(&args).await.unwrap(), 42);
    assert_eq!(calls(&counter), 1);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(cached.invoke(&args).await.unwrap(), 42);
    assert_eq!(calls(&counter), 2);
}

#[tokio::test]
async fn test_unreachable_redis_falls_back() {
    let counter = Arc::new(AtomicUsize::new(0));
    let store = StoreConfig::new()
        .with_host("127.0.0.1")
        .with_port(1)
        .with_timeout(Duration::from_millis(300));
    let cached = Cached::connect(
        counting_add(counter.clone()),
        &CacheConfig::new().with_store(store).with_key_prefix("math"),
    )
    .unwrap();

    let args = CallArgs::new().arg(2).arg(3);
    assert_eq!(cached.invoke(&args).await.unwrap(), 5);
    assert_eq!(cached.invoke(&args).await.unwrap(), 5);
    assert_eq!(calls(&counter), 2);
    assert_eq!(cached.stats().fallbacks, 2);
}

/// Accepts connections and never answers.
async fn silent_server() -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

#[tokio::test]
async fn test_hung_server_bounds_each_concurrent_caller() {
    let addr = silent_server().await;
    let timeout = Duration::from_millis(300);
    let store = StoreConfig::new()
        .with_host("127.0.0.1")
        .with_port(addr.port())
        .with_database(1)
        .with_timeout(timeout);
    let counter = Arc::new(AtomicUsize::new(0));
    let cached = Cached::connect(
        counting_add(counter.clone()),
        &CacheConfig::new().with_store(store).with_key_prefix("math"),
    )
    .unwrap();

    let started = Instant::now();
    let calls_in_flight = (0..5).map(|i| {
        let cached = &cached;
        async move { cached.invoke(&CallArgs::new().arg(i).arg(1)).await }
    });
    let results = futures::future::join_all(calls_in_flight).await;
    let elapsed = started.elapsed();

    for (i, result) in results.into_iter().enumerate() {
        assert_eq!(result.unwrap(), i as i64 + 1);
    }
    assert_eq!(calls(&counter), 5);
    assert_eq!(cached.stats().fallbacks, 5);
    // callers time out side by side rather than one after another
    assert!(elapsed < timeout * 3, "fallbacks took {:?}", elapsed);
}
