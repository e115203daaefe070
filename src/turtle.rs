//! Turtle state for laying out objects along a polyline.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A walker on the horizontal plane.
///
/// Tracks position and heading. The heading is kept as an accumulated yaw in
/// radians rather than wrapped, so objects placed along a long curve carry
/// monotonically growing rotations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurtleState {
    /// Current world-space position of the "cursor".
    pub position: Vec3,

    /// Yaw around the world Z axis, in radians. Zero faces `+X`.
    pub heading: f32,
}

impl Default for TurtleState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            heading: 0.0,
        }
    }
}

impl TurtleState {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Current orientation as a rotation about Z.
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_z(self.heading)
    }

    /// Returns the turtle's forward direction in world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::X
    }

    /// Moves `distance` along the current heading.
    pub fn advance(&mut self, distance: f32) {
        self.position += self.forward() * distance;
    }

    /// Rotates the heading by `angle` radians (Yaw).
    pub fn turn(&mut self, angle: f32) {
        self.heading += angle;
    }

    /// Euler rotation `[0, 0, heading + offset]` as the store expects it.
    pub fn euler(&self, offset: f32) -> Vec3 {
        Vec3::new(0.0, 0.0, self.heading + offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn advance_follows_heading() {
        let mut turtle = TurtleState::at(Vec3::new(1.0, 1.0, 2.0));
        turtle.advance(2.0);
        turtle.turn(FRAC_PI_2);
        turtle.advance(3.0);

        assert!(turtle.position.abs_diff_eq(Vec3::new(3.0, 4.0, 2.0), 1e-5));
        assert_eq!(turtle.euler(0.0), Vec3::new(0.0, 0.0, FRAC_PI_2));
    }
}
