use crate::key::CallArgs;
use crate::Error;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;

/// Fixed identity of a wrapped operation: namespace plus name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationId {
    pub namespace: String,
    pub name: String,
}

impl OperationId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// `namespace.name`, as it appears in cache keys.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// A computation whose results can be cached.
///
/// `&self` is the service context the computation runs against; it is not part
/// of the cache key. `Error: From<crate::Error>` lets the cache report
/// unserializable arguments or results through the operation's own error type,
/// while errors raised by `call` pass through untouched.
#[async_trait]
pub trait Operation: Send + Sync {
    type Output: Serialize + DeserializeOwned + Send;
    type Error: From<Error> + Send;

    fn id(&self) -> OperationId;

    async fn call(&self, args: &CallArgs) -> std::result::Result<Self::Output, Self::Error>;
}

/// Operation backed by an async closure.
pub struct FnOperation<F> {
    id: OperationId,
    f: F,
}

/// Wrap an async closure as an [`Operation`].
///
/// ```rust
/// use cache_aside::{from_fn, CallArgs, OperationId};
///
/// let add = from_fn(OperationId::new("mymodule", "add"), |args: CallArgs| async move {
///     let a = args.get(0).and_then(|v| v.as_i64()).unwrap_or(0);
///     let b = args.get(1).and_then(|v| v.as_i64()).unwrap_or(0);
///     Ok::<_, cache_aside::Error>(a + b)
/// });
/// ```
pub fn from_fn<F, Fut, T, E>(id: OperationId, f: F) -> FnOperation<F>
where
    F: Fn(CallArgs) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<T, E>> + Send,
    T: Serialize + DeserializeOwned + Send,
    E: From<Error> + Send,
{
    FnOperation { id, f }
}

#[async_trait]
impl<F, Fut, T, E> Operation for FnOperation<F>
where
    F: Fn(CallArgs) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<T, E>> + Send,
    T: Serialize + DeserializeOwned + Send,
    E: From<Error> + Send,
{
    type Output = T;
    type Error = E;

    fn id(&self) -> OperationId {
        self.id.clone()
    }

    async fn call(&self, args: &CallArgs) -> std::result::Result<T, E> {
        (self.f)(args.clone()).await
    }
}
