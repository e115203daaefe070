//! Continuous value animation driven by the store.
//!
//! Writing an [`AnimationSpec`] to a slot under the animation namespace makes
//! the store move the value at `value_path` by `speed` per unit time, either
//! forever or until `target_value` is reached. Deleting the slot stops it.

use crate::path::Path;
use crate::store::{SceneStore, StoreError, encode_body};
use serde::{Deserialize, Serialize};

/// What a slot animates and how fast.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationSpec {
    /// The value the store keeps updating.
    pub value_path: Path,
    /// Change per unit time. Sign gives direction for indefinite animations.
    pub speed: f32,
    /// Stop here. Absent means run until the slot is deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_value: Option<f32>,
    /// The value wraps at this period, e.g. `2π` for an angle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modulo: Option<f32>,
}

impl AnimationSpec {
    /// Indefinite change at `speed`.
    pub fn continuous(value_path: Path, speed: f32) -> Self {
        Self {
            value_path,
            speed,
            target_value: None,
            modulo: None,
        }
    }

    /// Move toward `target` at `speed`, then stop.
    pub fn toward(value_path: Path, target: f32, speed: f32) -> Self {
        Self {
            value_path,
            speed,
            target_value: Some(target),
            modulo: None,
        }
    }

    pub fn with_modulo(mut self, modulo: f32) -> Self {
        self.modulo = Some(modulo);
        self
    }
}

/// A path under the animation namespace.
///
/// At most one animation runs per slot; starting a new one replaces the old
/// one, which is how speed and direction change without a gap.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimationSlot {
    path: Path,
}

impl AnimationSlot {
    pub fn new(path: Path) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Starts or replaces the animation in this slot.
    pub async fn start(
        &self,
        store: &dyn SceneStore,
        spec: &AnimationSpec,
    ) -> Result<(), StoreError> {
        tracing::debug!(slot = %self.path, value = %spec.value_path, speed = spec.speed, "start animation");
        store.put(&self.path, encode_body(&self.path, spec)?).await
    }

    /// Cancels whatever runs in this slot. An empty slot is fine.
    pub async fn cancel(&self, store: &dyn SceneStore) -> Result<(), StoreError> {
        tracing::debug!(slot = %self.path, "cancel animation");
        store.delete(&self.path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_fields_are_omitted() {
        let spec = AnimationSpec::continuous(crate::path!["root", "camera", "orbitAngle"], 0.5);
        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!({"valuePath": ["root", "camera", "orbitAngle"], "speed": 0.5})
        );

        let spec = AnimationSpec::toward(crate::path!["root", "camera", "worldPosition", 0], 20.0, 15.0);
        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!({
                "valuePath": ["root", "camera", "worldPosition", 0],
                "speed": 15.0,
                "targetValue": 20.0
            })
        );
    }
}
