//! The remote scene store seen from the client.
//!
//! The store is a black box reachable through four verbs addressed by [`Path`].
//! Writing under the animation namespace starts a continuous update inside the
//! store; deleting there cancels it. Nothing here retries.

use crate::path::Path;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// Request verbs understood by the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures reported by a [`SceneStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no value at {0}")]
    NotFound(Path),

    #[error("{method} {path} rejected: {reason}")]
    Rejected {
        method: Method,
        path: Path,
        reason: String,
    },

    #[error("transport error on {method} {path}: {reason}")]
    Transport {
        method: Method,
        path: Path,
        reason: String,
    },

    #[error("unexpected value at {path}: {reason}")]
    Decode { path: Path, reason: String },

    #[error("cannot encode body for {path}: {reason}")]
    Encode { path: Path, reason: String },
}

/// Client side of the remote scene API.
#[async_trait]
pub trait SceneStore: Send + Sync {
    /// Reads the value at `path`.
    async fn get(&self, path: &Path) -> Result<Value, StoreError>;

    /// Replaces the value at `path`.
    async fn put(&self, path: &Path, value: Value) -> Result<(), StoreError>;

    /// Shallow-merges `value` into the value at `path`. An array is applied
    /// element-wise to a collection.
    async fn patch(&self, path: &Path, value: Value) -> Result<(), StoreError>;

    /// Removes the value at `path`. A trailing slice segment removes a range.
    /// Removing an absent value succeeds.
    async fn delete(&self, path: &Path) -> Result<(), StoreError>;
}

/// Serializes a request body bound for `path`.
pub fn encode_body<T: Serialize + ?Sized>(path: &Path, body: &T) -> Result<Value, StoreError> {
    serde_json::to_value(body).map_err(|e| StoreError::Encode {
        path: path.clone(),
        reason: e.to_string(),
    })
}

/// Reads the length of the collection at `path`.
///
/// A failed read or a non-array value counts as an empty collection.
pub async fn collection_len(store: &dyn SceneStore, path: &Path) -> usize {
    match store.get(path).await {
        Ok(Value::Array(items)) => items.len(),
        Ok(other) => {
            tracing::warn!(%path, kind = json_kind(&other), "expected a collection, counting 0");
            0
        }
        Err(err) => {
            tracing::warn!(%path, error = %err, "collection read failed, counting 0");
            0
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Per-method request totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestCounts {
    pub get: usize,
    pub put: usize,
    pub patch: usize,
    pub delete: usize,
}

impl RequestCounts {
    pub fn total(&self) -> usize {
        self.get + self.put + self.patch + self.delete
    }
}

impl std::fmt::Display for RequestCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GET:{} PUT:{} PATCH:{} DELETE:{}",
            self.get, self.put, self.patch, self.delete
        )
    }
}

/// Wraps a store and counts the requests passed through it.
pub struct CountingStore<S> {
    inner: S,
    counts: [AtomicUsize; 4],
}

impl<S: SceneStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            counts: Default::default(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn counts(&self) -> RequestCounts {
        let load = |m: Method| self.counts[m as usize].load(Ordering::Relaxed);
        RequestCounts {
            get: load(Method::Get),
            put: load(Method::Put),
            patch: load(Method::Patch),
            delete: load(Method::Delete),
        }
    }

    pub fn reset(&self) {
        for count in &self.counts {
            count.store(0, Ordering::Relaxed);
        }
    }

    fn bump(&self, method: Method) {
        self.counts[method as usize].fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl<S: SceneStore> SceneStore for CountingStore<S> {
    async fn get(&self, path: &Path) -> Result<Value, StoreError> {
        self.bump(Method::Get);
        self.inner.get(path).await
    }

    async fn put(&self, path: &Path, value: Value) -> Result<(), StoreError> {
        self.bump(Method::Put);
        self.inner.put(path, value).await
    }

    async fn patch(&self, path: &Path, value: Value) -> Result<(), StoreError> {
        self.bump(Method::Patch);
        self.inner.patch(path, value).await
    }

    async fn delete(&self, path: &Path) -> Result<(), StoreError> {
        self.bump(Method::Delete);
        self.inner.delete(path).await
    }
}

#[async_trait]
impl<T: SceneStore + ?Sized> SceneStore for std::sync::Arc<T> {
    async fn get(&self, path: &Path) -> Result<Value, StoreError> {
        (**self).get(path).await
    }

    async fn put(&self, path: &Path, value: Value) -> Result<(), StoreError> {
        (**self).put(path, value).await
    }

    async fn patch(&self, path: &Path, value: Value) -> Result<(), StoreError> {
        (**self).patch(path, value).await
    }

    async fn delete(&self, path: &Path) -> Result<(), StoreError> {
        (**self).delete(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn unencodable_bodies_are_errors() {
        let target = crate::path!["root", "floor"];
        assert_eq!(
            encode_body(&target, &[1.5, 2.0]).unwrap(),
            serde_json::json!([1.5, 2.0])
        );

        // JSON object keys must be strings.
        let body = BTreeMap::from([((1, 2), 3)]);
        match encode_body(&target, &body) {
            Err(StoreError::Encode { path, .. }) => assert_eq!(path, target),
            other => panic!("expected an encode error, got {other:?}"),
        }
    }
}
