//! Input mapping, raw key state and per-frame input snapshots.
//!
//! Raw identifiers are W3C `KeyboardEvent.code` names ("KeyW", "ArrowUp",
//! "ShiftLeft", ...). Capture code writes them into [`RawInputState`]; the
//! frame pipeline reads them once through [`InputMapping::normalize`].
#![forbid(unsafe_code)]

mod pointer;

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use pointer::{PointerDrift, PointerPhase, DEFAULT_IDLE_WINDOW};

pub const HORIZONTAL_AXIS: &str = "horizontal_axis";
pub const VERTICAL_AXIS: &str = "vertical_axis";
pub const JUMP_ACTION: &str = "jump";
pub const SPRINT_ACTION: &str = "sprint";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("unknown input axis '{0}'")]
    UnknownAxis(String),
    #[error("unknown input action '{0}'")]
    UnknownAction(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputCode(String);

impl InputCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for InputCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InputCode {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for InputCode {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for InputCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Currently held raw identifiers. Last write wins.
#[derive(Clone, Debug, Default)]
pub struct RawInputState {
    held: HashSet<InputCode>,
}

impl RawInputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, code: impl Into<InputCode>, held: bool) {
        let code = code.into();
        if held {
            self.held.insert(code);
        } else {
            self.held.remove(code.as_str());
        }
    }

    pub fn press(&mut self, code: impl Into<InputCode>) {
        self.set(code, true);
    }

    pub fn release(&mut self, code: impl Into<InputCode>) {
        self.set(code, false);
    }

    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, code: &str) -> bool {
        self.held.contains(code)
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisContribution {
    pub inputs: Vec<InputCode>,
    pub value: f32,
}

impl AxisContribution {
    pub fn new<I, C>(inputs: I, value: f32) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<InputCode>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            value,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionId(usize);

/// Declarative table from raw identifiers to semantic axes and actions.
///
/// Contents are not validated: duplicate identifiers across axes simply
/// contribute to each of them, and opposing contributions cancel only when
/// the chosen values do.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputMapping {
    #[serde(default)]
    pub scalar: BTreeMap<String, Vec<AxisContribution>>,
    #[serde(default)]
    pub discrete: BTreeMap<String, Vec<InputCode>>,
}

impl Default for InputMapping {
    fn default() -> Self {
        Self::empty()
            .with_axis(
                HORIZONTAL_AXIS,
                vec![
                    AxisContribution::new(["KeyA", "ArrowLeft"], -1.0),
                    AxisContribution::new(["KeyD", "ArrowRight"], 1.0),
                ],
            )
            .with_axis(
                VERTICAL_AXIS,
                vec![
                    AxisContribution::new(["KeyS", "ArrowDown"], -1.0),
                    AxisContribution::new(["KeyW", "ArrowUp"], 1.0),
                ],
            )
            .with_action(JUMP_ACTION, ["Space"])
            .with_action(SPRINT_ACTION, ["ShiftLeft", "ShiftRight"])
    }
}

impl InputMapping {
    pub fn empty() -> Self {
        Self {
            scalar: BTreeMap::new(),
            discrete: BTreeMap::new(),
        }
    }

    pub fn with_axis(mut self, name: impl Into<String>, contributions: Vec<AxisContribution>) -> Self {
        self.scalar.insert(name.into(), contributions);
        self
    }

    pub fn with_action<I, C>(mut self, name: impl Into<String>, inputs: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<InputCode>,
    {
        self.discrete
            .insert(name.into(), inputs.into_iter().map(Into::into).collect());
        self
    }

    pub fn axis_id(&self, name: &str) -> Result<AxisId, InputError> {
        self.scalar
            .keys()
            .position(|axis| axis == name)
            .map(AxisId)
            .ok_or_else(|| InputError::UnknownAxis(name.to_string()))
    }

    pub fn action_id(&self, name: &str) -> Result<ActionId, InputError> {
        self.discrete
            .keys()
            .position(|action| action == name)
            .map(ActionId)
            .ok_or_else(|| InputError::UnknownAction(name.to_string()))
    }

    /// Builds this frame's snapshot. Cost is linear in the number of mapped
    /// identifiers.
    pub fn normalize<'a>(&'a self, raw: &RawInputState) -> InputSnapshot<'a> {
        let axes = self
            .scalar
            .values()
            .map(|contributions| {
                contributions
                    .iter()
                    .filter(|contribution| any_held(raw, &contribution.inputs))
                    .map(|contribution| contribution.value)
                    .sum::<f32>()
            })
            .collect();
        let actions = self
            .discrete
            .values()
            .map(|inputs| any_held(raw, inputs))
            .collect();
        InputSnapshot {
            mapping: self,
            axes,
            actions,
        }
    }
}

fn any_held(raw: &RawInputState, inputs: &[InputCode]) -> bool {
    inputs.iter().any(|code| raw.is_held(code.as_str()))
}

pub fn normalize<'a>(raw: &RawInputState, mapping: &'a InputMapping) -> InputSnapshot<'a> {
    mapping.normalize(raw)
}

/// Axis and action values for one frame. Borrows the mapping it was built
/// from, so it cannot outlive the frame that produced it.
#[derive(Clone, Debug)]
pub struct InputSnapshot<'a> {
    mapping: &'a InputMapping,
    axes: Vec<f32>,
    actions: Vec<bool>,
}

impl<'a> InputSnapshot<'a> {
    pub fn axis(&self, name: &str) -> Result<f32, InputError> {
        self.mapping.axis_id(name).map(|id| self.axis_value(id))
    }

    pub fn action(&self, name: &str) -> Result<bool, InputError> {
        self.mapping.action_id(name).map(|id| self.action_active(id))
    }

    /// Panics if `id` was resolved against a different mapping.
    pub fn axis_value(&self, id: AxisId) -> f32 {
        self.axes[id.0]
    }

    /// Panics if `id` was resolved against a different mapping.
    pub fn action_active(&self, id: ActionId) -> bool {
        self.actions[id.0]
    }

}
