//! Speed-based interactive control of single store values.
//!
//! A [`MotionControl`] owns one value path and one animation slot. Moving
//! writes an open-ended animation into the slot, stopping deletes it, and
//! setting writes an animation with a target so the store stops on its own.
//! Every control has its own slot, derived from its group and name, so two
//! controls moving at once never cancel each other.

use crate::animation::{AnimationSlot, AnimationSpec};
use crate::config::SceneConfig;
use crate::cursor::{Cursor, CursorTarget};
use crate::error::{SceneError, SceneResult};
use crate::path::Path;
use crate::store::{SceneStore, StoreError};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Hover affordances. Speed scales with the square of the label length, so a
/// double nudge is four times a single one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Nudge {
    FastUp,
    Up,
    Down,
    FastDown,
}

impl Nudge {
    pub const ALL: [Nudge; 4] = [Nudge::FastUp, Nudge::Up, Nudge::Down, Nudge::FastDown];

    pub fn label(self) -> &'static str {
        match self {
            Nudge::FastUp => "++",
            Nudge::Up => "+",
            Nudge::Down => "-",
            Nudge::FastDown => "--",
        }
    }

    pub fn factor(self) -> f32 {
        let len = self.label().len() as f32;
        let sign = if self.label().starts_with('+') { 1.0 } else { -1.0 };
        len * len * sign
    }
}

impl fmt::Display for Nudge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Nudge {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Nudge::ALL
            .into_iter()
            .find(|n| n.label() == s)
            .ok_or_else(|| format!("unknown nudge {s:?}, expected one of ++ + - --"))
    }
}

/// Move, stop, read and set one value in the store.
#[derive(Clone)]
pub struct MotionControl {
    name: String,
    value_path: Path,
    unit: f32,
    slot: AnimationSlot,
    linked: Vec<AnimationSlot>,
    set_speed_factor: f32,
    store: Arc<dyn SceneStore>,
}

impl fmt::Debug for MotionControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionControl")
            .field("name", &self.name)
            .field("value_path", &self.value_path)
            .field("unit", &self.unit)
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

impl MotionControl {
    pub fn new(
        store: Arc<dyn SceneStore>,
        name: impl Into<String>,
        value_path: Path,
        unit: f32,
        slot: AnimationSlot,
    ) -> Self {
        Self {
            name: name.into(),
            value_path,
            unit,
            slot,
            linked: Vec::new(),
            set_speed_factor: SceneConfig::default().set_speed_factor,
            store,
        }
    }

    /// Also cancel `slot` whenever this control stops.
    pub fn with_linked_slot(mut self, slot: AnimationSlot) -> Self {
        self.linked.push(slot);
        self
    }

    pub fn with_set_speed_factor(mut self, factor: f32) -> Self {
        self.set_speed_factor = factor;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_path(&self) -> &Path {
        &self.value_path
    }

    pub fn unit(&self) -> f32 {
        self.unit
    }

    pub fn slot(&self) -> &AnimationSlot {
        &self.slot
    }

    /// Starts changing the value at `speed` per unit time, replacing any
    /// motion already in this control's slot.
    pub async fn move_at(&self, speed: f32) -> SceneResult<()> {
        let spec = AnimationSpec::continuous(self.value_path.clone(), speed);
        self.slot.start(self.store.as_ref(), &spec).await?;
        Ok(())
    }

    /// Moves at the speed of a hover affordance.
    pub async fn nudge(&self, nudge: Nudge) -> SceneResult<()> {
        tracing::debug!(control = %self.name, %nudge, "move");
        self.move_at(self.unit * nudge.factor()).await
    }

    /// Halts continuous change. Stopping a still control is fine.
    pub async fn stop(&self) -> SceneResult<()> {
        tracing::debug!(control = %self.name, "stop");
        self.slot.cancel(self.store.as_ref()).await?;
        for linked in &self.linked {
            linked.cancel(self.store.as_ref()).await?;
        }
        Ok(())
    }

    /// Current value.
    pub async fn get(&self) -> SceneResult<f32> {
        let value = self.store.get(&self.value_path).await?;
        value.as_f64().map(|v| v as f32).ok_or_else(|| {
            SceneError::Store(StoreError::Decode {
                path: self.value_path.clone(),
                reason: format!("expected a number, got {value}"),
            })
        })
    }

    /// Animates toward `value` at `speed`; the store stops at the target.
    pub async fn set(&self, value: f32, speed: f32) -> SceneResult<()> {
        let spec = AnimationSpec::toward(self.value_path.clone(), value, speed);
        self.slot.start(self.store.as_ref(), &spec).await?;
        Ok(())
    }

    /// Sets `value` at this control's standard speed.
    pub async fn set_value(&self, value: f32) -> SceneResult<()> {
        self.set(value, self.unit * self.set_speed_factor).await
    }
}

/// Named controls sharing a panel.
#[derive(Clone, Debug)]
pub struct ControlGroup {
    name: String,
    controls: Vec<MotionControl>,
}

impl ControlGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            controls: Vec::new(),
        }
    }

    /// Slot path for a control of group `group`: a pure function of the two
    /// names, distinct for distinct controls.
    pub fn slot_for(config: &SceneConfig, group: &str, control: &str) -> AnimationSlot {
        AnimationSlot::new(
            config
                .control_animations_path
                .child(group)
                .child(control.to_lowercase()),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add(&mut self, control: MotionControl) -> SceneResult<()> {
        let clash = self.controls.iter().any(|c| {
            c.name.eq_ignore_ascii_case(&control.name) || c.slot == control.slot
        });
        if clash {
            return Err(SceneError::DuplicateControl(control.name));
        }
        self.controls.push(control);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn controls(&self) -> &[MotionControl] {
        &self.controls
    }

    pub fn index_of(&self, name: &str) -> SceneResult<usize> {
        self.controls
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| SceneError::UnknownControl(name.to_string()))
    }

    pub fn control(&self, name: &str) -> SceneResult<&MotionControl> {
        Ok(&self.controls[self.index_of(name)?])
    }

    /// Stops every control of the group.
    pub async fn stop_all(&self) -> SceneResult<()> {
        for control in &self.controls {
            control.stop().await?;
        }
        Ok(())
    }

    fn preset(
        store: &Arc<dyn SceneStore>,
        config: &SceneConfig,
        group: &str,
        prefix: &Path,
        entries: &[(&str, Path, f32)],
    ) -> Self {
        let controls = entries
            .iter()
            .map(|(name, dimension, unit)| {
                MotionControl::new(
                    Arc::clone(store),
                    *name,
                    prefix.join(dimension),
                    *unit,
                    Self::slot_for(config, group, name),
                )
                .with_set_speed_factor(config.set_speed_factor)
            })
            .collect();
        Self {
            name: group.to_string(),
            controls,
        }
    }

    /// Zoom, orbit and position of the camera. Stopping any of them also
    /// halts a camera reset in progress.
    pub fn camera(store: Arc<dyn SceneStore>, config: &SceneConfig) -> Self {
        let mut group = Self::preset(
            &store,
            config,
            "camera",
            &config.camera_path,
            &[
                ("Zoom", crate::path!["orbitDistance"], -5.0),
                ("Orbit", crate::path!["orbitAngle"], 0.5),
                ("Altitude", crate::path!["worldPosition", 2], 5.0),
                ("X", crate::path!["worldPosition", 0], 5.0),
                ("Y", crate::path!["worldPosition", 1], 5.0),
            ],
        );
        let reset = AnimationSlot::new(config.camera_reset_path.clone());
        for control in &mut group.controls {
            control.linked.push(reset.clone());
        }
        group
    }

    /// Shape and placement of the cursor.
    pub fn cursor(store: Arc<dyn SceneStore>, config: &SceneConfig) -> Self {
        Self::preset(
            &store,
            config,
            "cursor",
            &config.cursor_path,
            &[
                ("Offset", crate::path!["offset"], 1.0),
                ("Length", crate::path!["length"], 1.0),
                ("Radius", crate::path!["radius"], 1.0),
                ("Rotation", crate::path!["rotation"], 0.5),
            ],
        )
    }
}

/// Stops the camera controls, returns the cursor to the floor and sends the
/// camera back to `config.camera_home`.
pub async fn reset_camera(
    store: &dyn SceneStore,
    camera: &ControlGroup,
    cursor: &Cursor,
    config: &SceneConfig,
) -> SceneResult<()> {
    camera.stop_all().await?;
    cursor.set_subject(CursorTarget::Floor).await?;
    let home = config.camera_home.to_array();
    for (axis, target) in home.into_iter().enumerate() {
        let value_path = config.camera_path.child("worldPosition").child(axis);
        let spec = AnimationSpec::toward(value_path, target, config.camera_reset_speed);
        AnimationSlot::new(config.camera_reset_path.child(axis))
            .start(store, &spec)
            .await?;
    }
    tracing::info!("camera reset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nudge_speeds_square_the_label() {
        assert_eq!(Nudge::FastUp.factor(), 4.0);
        assert_eq!(Nudge::Up.factor(), 1.0);
        assert_eq!(Nudge::Down.factor(), -1.0);
        assert_eq!(Nudge::FastDown.factor(), -4.0);
        assert_eq!("--".parse::<Nudge>(), Ok(Nudge::FastDown));
        assert!("+++".parse::<Nudge>().is_err());
    }

    #[test]
    fn slots_depend_on_group_and_name() {
        let config = SceneConfig::default();
        let zoom = ControlGroup::slot_for(&config, "camera", "Zoom");
        let orbit = ControlGroup::slot_for(&config, "camera", "Orbit");
        assert_ne!(zoom, orbit);
        assert_eq!(zoom, ControlGroup::slot_for(&config, "camera", "Zoom"));
        assert_eq!(
            zoom.path(),
            &crate::path!["animations", "user_interface", "camera", "zoom"]
        );
    }
}
