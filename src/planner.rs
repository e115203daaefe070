//! Generators that expand build parameters into a [`BuildPlan`].
//!
//! Both generators are pure: same parameters and layout, same plan. Nothing here
//! touches the store, so plans can be inspected before any build runs.
//!
//! * [`Pile`] stacks cubes on a regular grid.
//! * [`Fence`] walks a [`TurtleState`] along a turning polyline, placing a post
//!   and a spinning cap at every step.

use crate::animation::{AnimationSlot, AnimationSpec};
use crate::config::SceneConfig;
use crate::error::PlanError;
use crate::plan::{BuildPlan, PlanEntry, SceneObjectDescriptor};
use crate::turtle::TurtleState;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_4, PI, TAU};

/// Height of a cap above the top of its post.
const CAP_CLEARANCE: f32 = 2.0;
/// Vertical scale of a cap.
const CAP_THICKNESS: f32 = 0.5;
/// Largest plan either generator accepts.
pub const MAX_OBJECTS: usize = 1 << 20;

fn positive(name: &'static str, value: f32) -> Result<(), PlanError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PlanError::NotPositive { name, value })
    }
}

fn bounded(name: &'static str, count: Option<usize>) -> Result<usize, PlanError> {
    count
        .filter(|&n| n <= MAX_OBJECTS)
        .ok_or(PlanError::TooMany {
            name,
            limit: MAX_OBJECTS,
        })
}

fn finite(name: &'static str, value: f32) -> Result<(), PlanError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PlanError::NotFinite { name, value })
    }
}

/// A `width × depth × height` grid of unit cubes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pile {
    /// Cubes along Y.
    pub width: usize,
    /// Cubes along X.
    pub depth: usize,
    /// Cubes along Z.
    pub height: usize,
    /// Distance between neighbouring cube centres.
    pub separation: f32,
}

impl Default for Pile {
    fn default() -> Self {
        Self {
            width: 2,
            depth: 1,
            height: 3,
            separation: 1.5,
        }
    }
}

impl Pile {
    /// Cubes in the grid, `None` on overflow.
    pub fn object_count(&self) -> Option<usize> {
        self.width.checked_mul(self.depth)?.checked_mul(self.height)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        positive("separation", self.separation)?;
        bounded("pile", self.object_count()).map(drop)
    }

    /// Lays the grid out from `config.build_origin`, X outermost and Z innermost.
    pub fn plan(&self, config: &SceneConfig) -> BuildPlan {
        let origin = config.build_origin;
        let capacity = self.object_count().unwrap_or(0).min(MAX_OBJECTS);
        let mut entries = Vec::with_capacity(capacity);
        for x in 0..self.depth {
            for y in 0..self.width {
                for z in 0..self.height {
                    let offset = Vec3::new(x as f32, y as f32, z as f32) * self.separation;
                    entries.push(PlanEntry::object(SceneObjectDescriptor::cube(origin + offset)));
                }
            }
        }
        BuildPlan::new(entries)
    }
}

/// Posts along a turning polyline, each topped by a spinning cap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fence {
    pub posts: usize,
    /// Distance between consecutive posts.
    pub separation: f32,
    /// Heading change after each post, in degrees.
    pub turn_degrees: f32,
    /// Cap spin speed, in degrees per unit time.
    pub spin_degrees: f32,
    /// Vertical scale of each post.
    pub height: f32,
}

impl Default for Fence {
    fn default() -> Self {
        Self {
            posts: 2,
            separation: 4.0,
            turn_degrees: 10.0,
            spin_degrees: 240.0,
            height: 3.0,
        }
    }
}

impl Fence {
    /// Posts plus caps, `None` on overflow.
    pub fn object_count(&self) -> Option<usize> {
        self.posts.checked_mul(2)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        bounded("posts", self.object_count())?;
        positive("separation", self.separation)?;
        positive("height", self.height)?;
        finite("turn_degrees", self.turn_degrees)?;
        finite("spin_degrees", self.spin_degrees)
    }

    /// Emits post then cap for every step, so post `i` is object `2i` and its
    /// cap is object `2i + 1`. Cap `i` spins in slot `object_animations/i`.
    pub fn plan(&self, config: &SceneConfig) -> BuildPlan {
        let turn = self.turn_degrees / 180.0 * PI;
        let spin = self.spin_degrees / 180.0 * PI;

        let mut turtle = TurtleState::at(config.build_origin + Vec3::Z * self.height);
        let capacity = self.object_count().unwrap_or(0).min(MAX_OBJECTS);
        let mut entries = Vec::with_capacity(capacity);

        for post in 0..self.posts {
            let post_descriptor = SceneObjectDescriptor::cube(turtle.position)
                .with_rotation(turtle.euler(0.0))
                .with_scale(Vec3::new(1.0, 1.0, self.height));
            entries.push(PlanEntry::object(post_descriptor));

            let cap_position = turtle.position + Vec3::Z * (self.height + CAP_CLEARANCE);
            let cap_descriptor = SceneObjectDescriptor::cube(cap_position)
                .with_rotation(turtle.euler(FRAC_PI_4))
                .with_scale(Vec3::new(1.0, 1.0, CAP_THICKNESS));
            let cap_yaw = config.object_path(post * 2 + 1).child("rotation").child(2);
            let spec = AnimationSpec::continuous(cap_yaw, spin).with_modulo(TAU);
            let slot = AnimationSlot::new(config.object_animations_path.child(post));
            entries.push(PlanEntry::animated(cap_descriptor, spec, slot));

            turtle.advance(self.separation);
            turtle.turn(turn);
        }

        BuildPlan::new(entries)
    }
}

/// Parameters for either generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Construction {
    Pile(Pile),
    Fence(Fence),
}

impl Construction {
    pub fn validate(&self) -> Result<(), PlanError> {
        match self {
            Construction::Pile(p) => p.validate(),
            Construction::Fence(f) => f.validate(),
        }
    }

    pub fn plan(&self, config: &SceneConfig) -> BuildPlan {
        match self {
            Construction::Pile(p) => p.plan(config),
            Construction::Fence(f) => f.plan(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pile_walks_x_then_y_then_z() {
        let pile = Pile {
            width: 2,
            depth: 2,
            height: 2,
            separation: 2.0,
        };
        let plan = pile.plan(&SceneConfig::default());
        let positions: Vec<Vec3> = plan.positions().collect();
        let origin = SceneConfig::default().build_origin;

        assert_eq!(positions.len(), 8);
        assert_eq!(positions[0], origin);
        assert_eq!(positions[1], origin + Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(positions[2], origin + Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(positions[4], origin + Vec3::new(2.0, 0.0, 0.0));
        assert!(plan.entries().iter().all(|e| !e.descriptor.physics_enabled));
        assert_eq!(plan.animations().count(), 0);
    }

    #[test]
    fn fence_caps_spin_their_own_object() {
        let fence = Fence {
            posts: 3,
            separation: 4.0,
            turn_degrees: 90.0,
            spin_degrees: 180.0,
            height: 2.0,
        };
        let plan = fence.plan(&SceneConfig::default());
        assert_eq!(plan.len(), 6);

        let cap = plan.get(3).unwrap();
        let animation = cap.animation.as_ref().unwrap();
        assert_eq!(
            animation.spec.value_path,
            crate::path!["root", "gameObjects", 3, "rotation", 2]
        );
        assert_eq!(animation.slot.path(), &crate::path!["animations", "gameObjects", 1]);
        assert!((animation.spec.speed - PI).abs() < 1e-6);
        assert_eq!(animation.spec.modulo, Some(TAU));
        assert!(plan.get(2).unwrap().animation.is_none());

        // Second post sits one separation along +X and faces +Y.
        let origin = SceneConfig::default().build_origin + Vec3::Z * 2.0;
        let post = &plan.get(2).unwrap().descriptor;
        assert!(post.position.abs_diff_eq(origin + Vec3::X * 4.0, 1e-5));
        assert!((post.rotation.z - PI / 2.0).abs() < 1e-6);
        assert_eq!(post.scale, Vec3::new(1.0, 1.0, 2.0));
    }

    #[test]
    fn validation_rejects_degenerate_spacing() {
        let pile = Pile {
            separation: 0.0,
            ..Default::default()
        };
        assert_eq!(
            pile.validate(),
            Err(PlanError::NotPositive {
                name: "separation",
                value: 0.0
            })
        );

        let fence = Fence {
            turn_degrees: f32::NAN,
            ..Default::default()
        };
        assert!(fence.validate().is_err());
    }

    #[test]
    fn validation_rejects_oversized_counts() {
        let too_many = PlanError::TooMany {
            name: "pile",
            limit: MAX_OBJECTS,
        };
        let overflowing = Pile {
            width: usize::MAX,
            depth: 2,
            ..Default::default()
        };
        assert_eq!(overflowing.object_count(), None);
        assert_eq!(overflowing.validate(), Err(too_many.clone()));

        let huge = Pile {
            width: MAX_OBJECTS,
            depth: 1,
            height: 2,
            separation: 1.0,
        };
        assert_eq!(huge.validate(), Err(too_many));

        let at_limit = Pile {
            width: MAX_OBJECTS,
            depth: 1,
            height: 1,
            separation: 1.0,
        };
        assert_eq!(at_limit.validate(), Ok(()));

        let fence = Fence {
            posts: usize::MAX,
            ..Default::default()
        };
        assert_eq!(fence.object_count(), None);
        assert_eq!(
            fence.validate(),
            Err(PlanError::TooMany {
                name: "posts",
                limit: MAX_OBJECTS
            })
        );
    }
}
