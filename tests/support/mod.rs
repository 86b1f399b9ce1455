//! Shared fixtures for integration tests

#![allow(dead_code)]

pub mod stub_store;

use cache_aside::{from_fn, CallArgs, Operation, OperationId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Error type of test operations: either the cache's own error or a
/// business failure raised by the computation.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Cache(#[from] cache_aside::Error),
    #[error("business failure: {0}")]
    Business(String),
}

/// `mymodule.add`, counting how often it really runs.
pub fn counting_add(calls: Arc<AtomicUsize>) -> impl Operation<Output = i64, Error = AppError> {
    from_fn(OperationId::new("mymodule", "add"), move |args: CallArgs| {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            let a = args.get(0).and_then(|v| v.as_i64()).unwrap_or(0);
            let b = args.get(1).and_then(|v| v.as_i64()).unwrap_or(0);
            Ok::<_, AppError>(a + b)
        }
    })
}

pub fn calls(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}
