//! Cursor subject selection.
//!
//! The cursor points at one constructed object or at the floor. Selection moves
//! around a ring of `object_count + 1` positions where the floor sits after the
//! last object, so stepping past either end wraps through the floor.

use crate::config::SceneConfig;
use crate::error::SceneResult;
use crate::path::Path;
use crate::store::{SceneStore, StoreError, collection_len, encode_body};
use std::fmt;
use std::sync::Arc;

/// What the cursor is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CursorTarget {
    /// The "no object" sentinel.
    Floor,
    Object(usize),
}

impl CursorTarget {
    /// Position on the ring of size `object_count + 1`.
    fn ring_index(self, object_count: usize) -> i64 {
        match self {
            CursorTarget::Floor => object_count as i64,
            CursorTarget::Object(i) => i as i64,
        }
    }

    fn from_ring(raw: i64, object_count: usize) -> Self {
        let size = object_count as i64 + 1;
        let index = raw.rem_euclid(size);
        if index == size - 1 {
            CursorTarget::Floor
        } else {
            CursorTarget::Object(index as usize)
        }
    }

    /// Moves `delta` places around the ring, wrapping in both directions.
    pub fn advance(self, delta: i64, object_count: usize) -> Self {
        let size = object_count as i64 + 1;
        Self::from_ring(self.ring_index(object_count) + delta.rem_euclid(size), object_count)
    }

    /// Absolute selection with the same wrapping: `-1` is the floor, `0` the
    /// first object.
    pub fn jump_to(value: i64, object_count: usize) -> Self {
        Self::from_ring(value, object_count)
    }

    /// Store path of the selected object.
    pub fn to_path(self, config: &SceneConfig) -> Path {
        match self {
            CursorTarget::Floor => config.floor_path.clone(),
            CursorTarget::Object(i) => config.object_path(i),
        }
    }

    /// Reads a stored subject path. Anything that is not an object of the
    /// collection counts as the floor.
    pub fn from_path(path: &Path, config: &SceneConfig) -> Self {
        let in_collection = path.len() == config.objects_path.len() + 1
            && path.starts_with(&config.objects_path);
        match path.last().and_then(|s| s.as_index()) {
            Some(i) if in_collection => CursorTarget::Object(i),
            _ => CursorTarget::Floor,
        }
    }
}

impl fmt::Display for CursorTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorTarget::Floor => f.write_str("floor"),
            CursorTarget::Object(i) => write!(f, "{i}"),
        }
    }
}

/// Reads and moves the cursor subject in the store.
#[derive(Clone)]
pub struct Cursor {
    store: Arc<dyn SceneStore>,
    config: Arc<SceneConfig>,
}

impl Cursor {
    pub fn new(store: Arc<dyn SceneStore>, config: Arc<SceneConfig>) -> Self {
        Self { store, config }
    }

    /// Current subject.
    pub async fn subject(&self) -> SceneResult<CursorTarget> {
        let path = &self.config.cursor_subject_path;
        let value = self.store.get(path).await?;
        let subject: Path = serde_json::from_value(value).map_err(|e| StoreError::Decode {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(CursorTarget::from_path(&subject, &self.config))
    }

    /// Points the cursor at `target`.
    pub async fn set_subject(&self, target: CursorTarget) -> SceneResult<()> {
        let subject = target.to_path(&self.config);
        tracing::debug!(%subject, "cursor subject");
        let path = &self.config.cursor_subject_path;
        let body = encode_body(path, &subject)?;
        self.store.put(path, body).await?;
        Ok(())
    }

    /// Moves the cursor `delta` places around the current objects.
    pub async fn step(&self, delta: i64) -> SceneResult<CursorTarget> {
        let count = collection_len(self.store.as_ref(), &self.config.objects_path).await;
        let next = self.subject().await?.advance(delta, count);
        self.set_subject(next).await?;
        Ok(next)
    }

    /// Selects position `value` on the ring, reading the object count.
    pub async fn jump(&self, value: i64) -> SceneResult<CursorTarget> {
        let count = collection_len(self.store.as_ref(), &self.config.objects_path).await;
        self.jump_within(value, count).await
    }

    /// Selects position `value` on a ring of a known object count.
    pub async fn jump_within(&self, value: i64, object_count: usize) -> SceneResult<CursorTarget> {
        let next = CursorTarget::jump_to(value, object_count);
        self.set_subject(next).await?;
        Ok(next)
    }
}
