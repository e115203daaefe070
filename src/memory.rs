//! In-process scene store.
//!
//! [`MemoryStore`] keeps the scene as a JSON tree and follows the same path
//! rules as the remote API: missing containers are created on write, a slice
//! segment fans out over an array range, and deleting an absent value is not an
//! error. Every request is logged so callers can assert on the exact traffic.
//! Animations are stored as plain values; nothing advances them.

use crate::path::{Path, Segment};
use crate::store::{Method, SceneStore, StoreError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::ops::Range;
use std::sync::{Mutex, MutexGuard};

/// One request as received by a [`MemoryStore`].
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: Path,
    pub body: Option<Value>,
}

#[derive(Default)]
struct State {
    root: Value,
    log: Vec<Request>,
    failures: Vec<(Method, Path)>,
}

/// JSON-tree store with a request log and failure injection.
pub struct MemoryStore {
    state: Mutex<State>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_root(Value::Object(Map::new()))
    }

    /// Starts from an existing tree.
    pub fn with_root(root: Value) -> Self {
        Self {
            state: Mutex::new(State {
                root,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of the whole tree.
    pub fn snapshot(&self) -> Value {
        self.lock().root.clone()
    }

    /// Reads a value without logging a request.
    pub fn value_at(&self, path: &Path) -> Option<Value> {
        read(&self.lock().root, path.segments())
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<Request> {
        self.lock().log.clone()
    }

    /// Requests of one method, oldest first.
    pub fn requests_of(&self, method: Method) -> Vec<Request> {
        self.lock()
            .log
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    pub fn clear_requests(&self) {
        self.lock().log.clear();
    }

    /// Makes every later `method` request on `prefix` or below fail.
    pub fn fail_on(&self, method: Method, prefix: Path) {
        self.lock().failures.push((method, prefix));
    }

    /// Logs the request and applies `op` unless a failure is armed for it.
    fn handle<T>(
        &self,
        method: Method,
        path: &Path,
        body: Option<Value>,
        op: impl FnOnce(&mut Value) -> Result<T, String>,
    ) -> Result<T, StoreError> {
        let mut state = self.lock();
        state.log.push(Request {
            method,
            path: path.clone(),
            body,
        });
        let armed = state
            .failures
            .iter()
            .any(|(m, prefix)| *m == method && path.starts_with(prefix));
        if armed {
            return Err(StoreError::Rejected {
                method,
                path: path.clone(),
                reason: "injected failure".to_string(),
            });
        }
        op(&mut state.root).map_err(|reason| StoreError::Rejected {
            method,
            path: path.clone(),
            reason,
        })
    }
}

#[async_trait]
impl SceneStore for MemoryStore {
    async fn get(&self, path: &Path) -> Result<Value, StoreError> {
        self.handle(Method::Get, path, None, |root| Ok(read(root, path.segments())))?
            .ok_or_else(|| StoreError::NotFound(path.clone()))
    }

    async fn put(&self, path: &Path, value: Value) -> Result<(), StoreError> {
        self.handle(Method::Put, path, Some(value.clone()), |root| {
            descend_mut(root, path.segments(), &mut |node| {
                *node = value.clone();
                Ok(())
            })
        })
    }

    async fn patch(&self, path: &Path, value: Value) -> Result<(), StoreError> {
        self.handle(Method::Patch, path, Some(value.clone()), |root| {
            descend_mut(root, path.segments(), &mut |node| {
                merge(node, &value);
                Ok(())
            })
        })
    }

    async fn delete(&self, path: &Path) -> Result<(), StoreError> {
        self.handle(Method::Delete, path, None, |root| {
            remove(root, path.segments());
            Ok(())
        })
    }
}

fn clamp(start: Option<usize>, end: Option<usize>, len: usize) -> Range<usize> {
    let start = start.unwrap_or(0).min(len);
    let end = end.unwrap_or(len).min(len).max(start);
    start..end
}

fn read(node: &Value, segments: &[Segment]) -> Option<Value> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(node.clone());
    };
    match head {
        Segment::Key(k) => read(node.as_object()?.get(k)?, rest),
        Segment::Index(i) => read(node.as_array()?.get(*i)?, rest),
        Segment::Slice { start, end } => {
            let items = node.as_array()?;
            let picked = items[clamp(*start, *end, items.len())]
                .iter()
                .map(|item| read(item, rest).unwrap_or(Value::Null))
                .collect();
            Some(Value::Array(picked))
        }
    }
}

/// Walks to every node addressed by `segments`, creating containers on the way,
/// and applies `apply` there.
fn descend_mut(
    node: &mut Value,
    segments: &[Segment],
    apply: &mut dyn FnMut(&mut Value) -> Result<(), String>,
) -> Result<(), String> {
    let Some((head, rest)) = segments.split_first() else {
        return apply(node);
    };
    match head {
        Segment::Key(k) => {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let Value::Object(fields) = node else {
                unreachable!()
            };
            descend_mut(fields.entry(k.clone()).or_insert(Value::Null), rest, apply)
        }
        Segment::Index(i) => {
            let items = ensure_array(node, *i + 1);
            descend_mut(&mut items[*i], rest, apply)
        }
        Segment::Slice { start, end } => {
            let Value::Array(items) = node else {
                return Err(format!("cannot slice a non-array at {head}"));
            };
            let range = clamp(*start, *end, items.len());
            for item in &mut items[range] {
                descend_mut(item, rest, apply)?;
            }
            Ok(())
        }
    }
}

fn ensure_array(node: &mut Value, len: usize) -> &mut Vec<Value> {
    if !node.is_array() {
        *node = Value::Array(Vec::new());
    }
    let Value::Array(items) = node else {
        unreachable!()
    };
    if items.len() < len {
        items.resize(len, Value::Null);
    }
    items
}

/// Shallow merge: object fields replace, arrays merge element-wise, anything
/// else replaces the target.
fn merge(target: &mut Value, patch: &Value) {
    match patch {
        Value::Object(fields) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(existing) = target {
                for (k, v) in fields {
                    existing.insert(k.clone(), v.clone());
                }
            }
        }
        Value::Array(elements) => {
            let items = ensure_array(target, elements.len());
            for (slot, element) in items.iter_mut().zip(elements) {
                merge(slot, element);
            }
        }
        other => *target = other.clone(),
    }
}

fn remove(node: &mut Value, segments: &[Segment]) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    if rest.is_empty() {
        match (head, node) {
            (Segment::Key(k), Value::Object(fields)) => {
                fields.remove(k);
            }
            (Segment::Index(i), Value::Array(items)) if *i < items.len() => {
                items.remove(*i);
            }
            (Segment::Slice { start, end }, Value::Array(items)) => {
                let range = clamp(*start, *end, items.len());
                items.drain(range);
            }
            _ => {}
        }
        return;
    }
    match (head, node) {
        (Segment::Key(k), Value::Object(fields)) => {
            if let Some(child) = fields.get_mut(k) {
                remove(child, rest);
            }
        }
        (Segment::Index(i), Value::Array(items)) => {
            if let Some(child) = items.get_mut(*i) {
                remove(child, rest);
            }
        }
        (Segment::Slice { start, end }, Value::Array(items)) => {
            let range = clamp(*start, *end, items.len());
            for item in &mut items[range] {
                remove(item, rest);
            }
        }
        _ => {}
    }
}
