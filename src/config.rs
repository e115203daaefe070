//! Store layout and tuning shared by the orchestrator, cursor and controls.

use crate::error::SceneError;
use crate::path::Path;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Where things live in the store and the constants used to drive them.
///
/// Built once and shared by reference; nothing mutates it afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Collection holding the constructed objects.
    pub objects_path: Path,
    /// The floor object.
    pub floor_path: Path,
    /// Where the current cursor subject path is stored.
    pub cursor_subject_path: Path,
    /// Animation namespace for per-object animations.
    pub object_animations_path: Path,
    /// Animation namespace for interactive controls.
    pub control_animations_path: Path,
    /// Slots used by the camera reset.
    pub camera_reset_path: Path,
    /// The camera object.
    pub camera_path: Path,
    /// The cursor object.
    pub cursor_path: Path,
    /// First object position of every generated plan.
    pub build_origin: Vec3,
    /// Margin added around the built objects when resizing the floor.
    pub floor_margin: f32,
    /// Floor extents after a clear.
    pub floor_default_scale: Vec2,
    /// Floor centre after a clear.
    pub floor_default_position: Vec2,
    /// `set` moves at `unit * set_speed_factor`.
    pub set_speed_factor: f32,
    /// Camera position targeted by a reset.
    pub camera_home: Vec3,
    /// Speed of the camera reset animations.
    pub camera_reset_speed: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            objects_path: crate::path!["root", "gameObjects"],
            floor_path: crate::path!["root", "floor"],
            cursor_subject_path: crate::path!["root", "cursors", 0, "subjectPath"],
            object_animations_path: crate::path!["animations", "gameObjects"],
            control_animations_path: crate::path!["animations", "user_interface"],
            camera_reset_path: crate::path!["animations", "reset_camera"],
            camera_path: crate::path!["root", "camera"],
            cursor_path: crate::path!["root", "cursors", 0],
            build_origin: Vec3::new(-1.5, -3.5, 0.5),
            floor_margin: 1.0,
            floor_default_scale: Vec2::new(10.0, 10.0),
            floor_default_position: Vec2::ZERO,
            set_speed_factor: 16.0,
            camera_home: Vec3::new(20.0, 1.0, 7.0),
            camera_reset_speed: 15.0,
        }
    }
}

impl SceneConfig {
    /// Parses a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, SceneError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads a TOML file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, SceneError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Path of the object at `index`.
    pub fn object_path(&self, index: usize) -> Path {
        self.objects_path.child(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overrides_keep_other_defaults() {
        let config = SceneConfig::from_toml_str(
            r#"
            floor_margin = 2.5
            objects_path = ["scene", "things"]
            build_origin = [0.0, 0.0, 1.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.floor_margin, 2.5);
        assert_eq!(config.object_path(4), crate::path!["scene", "things", 4]);
        assert_eq!(config.build_origin, Vec3::Z);
        assert_eq!(config.set_speed_factor, 16.0);
    }
}
