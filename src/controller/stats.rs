use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one cached operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Calls answered from the store.
    pub hits: u64,
    /// Calls that found no entry and computed.
    pub misses: u64,
    /// Calls that carried the bypass flag.
    pub bypasses: u64,
    /// Calls that computed directly because the store failed.
    pub fallbacks: u64,
    /// Computed results that could not be written back.
    pub write_failures: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
pub(crate) struct AtomicStats {
    pub(crate) hits: AtomicU64,
    pub(crate) misses: AtomicU64,
    pub(crate) bypasses: AtomicU64,
    pub(crate) fallbacks: AtomicU64,
    pub(crate) write_failures: AtomicU64,
}

impl AtomicStats {
    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            bypasses: self.bypasses.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }
}
