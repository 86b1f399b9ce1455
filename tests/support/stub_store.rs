//! Scriptable store stub for controller tests

use async_trait::async_trait;
use cache_aside::store::StoreResult;
use cache_aside::{CacheStore, StoreError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Exists,
    Get,
    Set,
    Delete,
}

/// In-memory store whose operations can be made to fail and whose entries
/// can be expired on demand.
#[derive(Default)]
pub struct StubStore {
    entries: Mutex<HashMap<String, (Vec<u8>, Duration)>>,
    failures: Mutex<HashMap<StoreOp, StoreError>>,
    log: Mutex<Vec<(StoreOp, String)>>,
    expire_before_get: AtomicBool,
}

impl StubStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, op: StoreOp, err: StoreError) {
        self.failures.lock().unwrap().insert(op, err);
    }

    pub fn fail_all(&self, err: StoreError) {
        for op in [StoreOp::Exists, StoreOp::Get, StoreOp::Set, StoreOp::Delete] {
            self.fail(op, err.clone());
        }
    }

    pub fn heal(&self) {
        self.failures.lock().unwrap().clear();
    }

    /// Simulate the TTL of every entry elapsing.
    pub fn expire_all(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// Make entries expire between `exists` and `get`: `exists` still sees
    /// them, `get` finds nothing.
    pub fn expire_before_get(&self) {
        self.expire_before_get.store(true, Ordering::SeqCst);
    }

    pub fn insert_raw(&self, key: &str, value: &[u8]) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_vec(), Duration::from_secs(60)));
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.entries.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().unwrap().get(key).map(|(v, _)| v.clone())
    }

    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
    }

    pub fn count(&self, op: StoreOp) -> usize {
        self.log.lock().unwrap().iter().filter(|(o, _)| *o == op).count()
    }

    fn record(&self, op: StoreOp, key: &str) -> StoreResult<()> {
        self.log.lock().unwrap().push((op, key.to_string()));
        match self.failures.lock().unwrap().get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CacheStore for StubStore {
    async fn exists(&self, key: &str) -> StoreResult<bool> {
        self.record(StoreOp::Exists, key)?;
        Ok(self.entries.lock().unwrap().contains_key(key))
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.record(StoreOp::Get, key)?;
        if self.expire_before_get.load(Ordering::SeqCst) {
            self.entries.lock().unwrap().remove(key);
            return Ok(None);
        }
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<()> {
        self.record(StoreOp::Set, key)?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_vec(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        self.record(StoreOp::Delete, key)?;
        Ok(self.entries.lock().unwrap().remove(key).is_some())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}
