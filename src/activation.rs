//! Hover versus direct-input activation for a panel of controls.
//!
//! Each control offers two affordances: hover nudges that move it while the
//! pointer rests on them, and a numeric input that sets it. A control never has
//! both live. Within a panel at most one control takes input; activating input
//! on one puts every other control into hover mode in the same transition.

use crate::control::{ControlGroup, MotionControl, Nudge};
use crate::error::SceneResult;
use thiserror::Error;

/// Activation of one control.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ControlState {
    /// Only before the panel's first transition.
    #[default]
    Idle,
    HoverActive,
    InputActive,
}

impl ControlState {
    pub fn hover_active(self) -> bool {
        self == ControlState::HoverActive
    }

    pub fn input_active(self) -> bool {
        self == ControlState::InputActive
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActivationError {
    #[error("control index {0} out of range")]
    OutOfRange(usize),

    #[error("control {0} cannot be both input and hover active")]
    Conflict(usize),

    #[error("at most one control may take input, got {0}")]
    MultipleInputs(usize),
}

/// Activation states of a group of controls, changed only in whole batches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivationGroup {
    states: Vec<ControlState>,
}

impl ActivationGroup {
    /// Every control starts idle.
    pub fn new(len: usize) -> Self {
        Self {
            states: vec![ControlState::Idle; len],
        }
    }

    /// Every control in hover mode, the steady state of a fresh panel.
    pub fn hovering(len: usize) -> Self {
        Self {
            states: vec![ControlState::HoverActive; len],
        }
    }

    pub fn states(&self) -> &[ControlState] {
        &self.states
    }

    pub fn state(&self, index: usize) -> Option<ControlState> {
        self.states.get(index).copied()
    }

    /// Index of the control taking input, if any.
    pub fn input_control(&self) -> Option<usize> {
        self.states.iter().position(|s| s.input_active())
    }

    /// Sets the `input` controls to input mode and the `hover` controls to
    /// hover mode in one step. Controls in neither list keep their state.
    /// Nothing changes if the batch is invalid.
    pub fn transition(&mut self, input: &[usize], hover: &[usize]) -> Result<(), ActivationError> {
        let mut next = self.states.clone();
        for &i in hover {
            *next.get_mut(i).ok_or(ActivationError::OutOfRange(i))? = ControlState::HoverActive;
        }
        for &i in input {
            if hover.contains(&i) {
                return Err(ActivationError::Conflict(i));
            }
            *next.get_mut(i).ok_or(ActivationError::OutOfRange(i))? = ControlState::InputActive;
        }
        let inputs = next.iter().filter(|s| s.input_active()).count();
        if inputs > 1 {
            return Err(ActivationError::MultipleInputs(inputs));
        }
        self.states = next;
        Ok(())
    }

    /// Input mode for `index`, hover mode for the rest.
    pub fn activate_input(&mut self, index: usize) -> Result<(), ActivationError> {
        let others: Vec<usize> = (0..self.states.len()).filter(|&i| i != index).collect();
        self.transition(&[index], &others)
    }

    /// Hover mode for every control.
    pub fn activate_hover(&mut self) -> Result<(), ActivationError> {
        let all: Vec<usize> = (0..self.states.len()).collect();
        self.transition(&[], &all)
    }

    /// Flips `index` between input mode and the all-hover panel. Returns
    /// `true` when `index` ends up taking input.
    pub fn toggle_input(&mut self, index: usize) -> Result<bool, ActivationError> {
        match self.state(index) {
            None => Err(ActivationError::OutOfRange(index)),
            Some(ControlState::InputActive) => self.activate_hover().map(|_| false),
            Some(_) => self.activate_input(index).map(|_| true),
        }
    }
}

/// A control group with its activation states, gating which control
/// operations the affordances may invoke.
#[derive(Clone, Debug)]
pub struct ControlPanel {
    group: ControlGroup,
    activation: ActivationGroup,
}

impl ControlPanel {
    /// Starts with every control in hover mode.
    pub fn new(group: ControlGroup) -> Self {
        let activation = ActivationGroup::hovering(group.len());
        Self { group, activation }
    }

    pub fn group(&self) -> &ControlGroup {
        &self.group
    }

    pub fn activation(&self) -> &ActivationGroup {
        &self.activation
    }

    pub fn state(&self, name: &str) -> SceneResult<ControlState> {
        let index = self.group.index_of(name)?;
        Ok(self.activation.states()[index])
    }

    fn control(&self, name: &str) -> SceneResult<(usize, &MotionControl)> {
        let index = self.group.index_of(name)?;
        Ok((index, &self.group.controls()[index]))
    }

    /// Gives `name` the input and returns its current value for display.
    pub async fn activate_input(&mut self, name: &str) -> SceneResult<f32> {
        let index = self.group.index_of(name)?;
        self.activation.activate_input(index)?;
        self.group.controls()[index].get().await
    }

    pub fn activate_hover(&mut self) -> SceneResult<()> {
        self.activation.activate_hover()?;
        Ok(())
    }

    /// Clicking a control's label. Returns the value to display when the
    /// control now takes input.
    pub async fn toggle_input(&mut self, name: &str) -> SceneResult<Option<f32>> {
        let index = self.group.index_of(name)?;
        if self.activation.toggle_input(index)? {
            Ok(Some(self.group.controls()[index].get().await?))
        } else {
            Ok(None)
        }
    }

    /// Pointer enters a nudge. Moves only in hover mode; returns whether it did.
    pub async fn hover_enter(&self, name: &str, nudge: Nudge) -> SceneResult<bool> {
        let (index, control) = self.control(name)?;
        if !self.activation.states()[index].hover_active() {
            return Ok(false);
        }
        control.nudge(nudge).await?;
        Ok(true)
    }

    /// Pointer leaves a nudge. Stops only in hover mode; returns whether it did.
    pub async fn hover_leave(&self, name: &str) -> SceneResult<bool> {
        let (index, control) = self.control(name)?;
        if !self.activation.states()[index].hover_active() {
            return Ok(false);
        }
        control.stop().await?;
        Ok(true)
    }

    /// Clicking a nudge switches the panel back to hover mode and moves.
    pub async fn click_nudge(&mut self, name: &str, nudge: Nudge) -> SceneResult<()> {
        let index = self.group.index_of(name)?;
        self.activation.activate_hover()?;
        self.group.controls()[index].nudge(nudge).await
    }

    /// A value typed into `name`'s input. Applied only while that control
    /// takes input; returns whether it was.
    pub async fn input_value(&self, name: &str, value: f32) -> SceneResult<bool> {
        let (index, control) = self.control(name)?;
        if !self.activation.states()[index].input_active() {
            return Ok(false);
        }
        control.set_value(value).await?;
        Ok(true)
    }
}
