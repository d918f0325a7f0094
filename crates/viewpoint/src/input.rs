//! Sampled per-frame input.
//!
//! The core never buffers input. Each frame the host hands over what is down,
//! what went down this frame and what came up this frame.

use bevy_math::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Logical actions the state machines react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Cycle the held device.
    SwitchDevice,
    /// Enter/advance trail view, or cycle the docked group.
    Cycle,
    /// Leave any special view.
    Cancel,
    /// Dock, toggle a group, or work a door.
    Interact,
    /// Camcorder viewfinder (held).
    Aim,
    /// Polaroid shutter.
    Capture,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::SwitchDevice,
        Action::Cycle,
        Action::Cancel,
        Action::Interact,
        Action::Aim,
        Action::Capture,
    ];
}

/// Per-frame input queries.
pub trait InputSource {
    /// Went down this frame.
    fn pressed(&self, action: Action) -> bool;
    /// Is down this frame.
    fn held(&self, action: Action) -> bool;
    /// Came up this frame.
    fn released(&self, action: Action) -> bool;
    /// Look axis delta for this frame.
    fn look_axis(&self) -> Vec2;
}

/// A plain snapshot of one frame's input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    pressed: HashSet<Action>,
    held: HashSet<Action>,
    released: HashSet<Action>,
    look: Vec2,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `action` as going down this frame (and therefore held).
    pub fn press(mut self, action: Action) -> Self {
        self.pressed.insert(action);
        self.held.insert(action);
        self
    }

    /// Marks `action` as held without an edge.
    pub fn hold(mut self, action: Action) -> Self {
        self.held.insert(action);
        self
    }

    /// Marks `action` as coming up this frame.
    pub fn release(mut self, action: Action) -> Self {
        self.released.insert(action);
        self.held.remove(&action);
        self
    }

    pub fn with_look(mut self, look: Vec2) -> Self {
        self.look = look;
        self
    }

    pub fn set_pressed(&mut self, action: Action) {
        self.pressed.insert(action);
        self.held.insert(action);
    }

    pub fn set_held(&mut self, action: Action) {
        self.held.insert(action);
    }

    pub fn set_released(&mut self, action: Action) {
        self.released.insert(action);
        self.held.remove(&action);
    }

    pub fn set_look(&mut self, look: Vec2) {
        self.look = look;
    }

    /// Builds the next frame from this one: edges clear, held keys stay held.
    pub fn carry_over(&self) -> Self {
        Self {
            pressed: HashSet::new(),
            held: self.held.clone(),
            released: HashSet::new(),
            look: Vec2::ZERO,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.pressed.is_empty() && self.held.is_empty() && self.released.is_empty()
    }
}

impl InputSource for InputSnapshot {
    fn pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    fn held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    fn released(&self, action: Action) -> bool {
        self.released.contains(&action)
    }

    fn look_axis(&self) -> Vec2 {
        self.look
    }
}
