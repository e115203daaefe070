//! Build plans: the ordered objects a build realizes in the store.

use crate::animation::{AnimationSlot, AnimationSpec};
use bevy_math::Rect;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One object as written to the store.
///
/// Field names follow the store's object schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneObjectDescriptor {
    /// World-space centre.
    #[serde(rename = "worldPosition")]
    pub position: Vec3,

    /// Euler angles in radians.
    pub rotation: Vec3,

    /// World-space scale of the unit cube.
    #[serde(rename = "worldScale")]
    pub scale: Vec3,

    /// Objects are built with physics off and dropped later.
    #[serde(rename = "physics")]
    pub physics_enabled: bool,
}

impl SceneObjectDescriptor {
    /// A unit cube at `position` with neutral rotation and physics off.
    pub fn cube(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            physics_enabled: false,
        }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

/// An animation registered for an object right after it is written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannedAnimation {
    pub spec: AnimationSpec,
    pub slot: AnimationSlot,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub descriptor: SceneObjectDescriptor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<PlannedAnimation>,
}

impl PlanEntry {
    pub fn object(descriptor: SceneObjectDescriptor) -> Self {
        Self {
            descriptor,
            animation: None,
        }
    }

    pub fn animated(descriptor: SceneObjectDescriptor, spec: AnimationSpec, slot: AnimationSlot) -> Self {
        Self {
            descriptor,
            animation: Some(PlannedAnimation { spec, slot }),
        }
    }
}

/// Ordered, immutable list of objects to realize.
///
/// Entry `i` becomes object `i` of the target collection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildPlan {
    entries: Vec<PlanEntry>,
}

impl BuildPlan {
    pub fn new(entries: Vec<PlanEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&PlanEntry> {
        self.entries.get(index)
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.entries.iter().map(|e| e.descriptor.position)
    }

    pub fn animations(&self) -> impl Iterator<Item = &PlannedAnimation> + '_ {
        self.entries.iter().filter_map(|e| e.animation.as_ref())
    }

    /// All descriptors, for a single collection write.
    pub fn descriptors(&self) -> Vec<&SceneObjectDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    /// All animation specs in plan order.
    pub fn animation_specs(&self) -> Vec<&AnimationSpec> {
        self.animations().map(|a| &a.spec).collect()
    }

    /// Horizontal bounding rectangle of every position grown by `margin` on
    /// each side. `None` for an empty plan.
    pub fn footprint(&self, margin: f32) -> Option<Rect> {
        let mut points = self.positions().map(|p| p.truncate());
        let first = points.next()?;
        let rect = points.fold(Rect::from_corners(first, first), |rect, p| rect.union_point(p));
        Some(rect.inflate(margin))
    }
}

impl<'a> IntoIterator for &'a BuildPlan {
    type Item = &'a PlanEntry;
    type IntoIter = std::slice::Iter<'a, PlanEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn footprint_bounds_horizontal_positions() {
        let plan = BuildPlan::new(vec![
            PlanEntry::object(SceneObjectDescriptor::cube(Vec3::new(-1.0, 2.0, 9.0))),
            PlanEntry::object(SceneObjectDescriptor::cube(Vec3::new(3.0, -2.0, 0.5))),
        ]);
        let rect = plan.footprint(1.0).unwrap();
        assert_eq!(rect.min, Vec2::new(-2.0, -3.0));
        assert_eq!(rect.max, Vec2::new(4.0, 3.0));
        assert_eq!(rect.center(), Vec2::new(1.0, 0.0));
        assert_eq!(rect.size(), Vec2::new(6.0, 6.0));

        assert!(BuildPlan::default().footprint(1.0).is_none());
    }

    #[test]
    fn descriptor_uses_store_field_names() {
        let value = serde_json::to_value(SceneObjectDescriptor::cube(Vec3::new(1.0, 2.0, 3.0))).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "worldPosition": [1.0, 2.0, 3.0],
                "rotation": [0.0, 0.0, 0.0],
                "worldScale": [1.0, 1.0, 1.0],
                "physics": false
            })
        );
    }
}
