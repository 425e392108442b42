//! Keyboard input mapping and the held-action set.
//!
//! Raw key-down/key-up events arrive from the host and are mapped through a
//! fixed table to gameplay actions. The mapping is not configurable at
//! runtime.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Gameplay actions currently held.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct HeldActions: u8 {
        /// Move left.
        const LEFT = 1 << 0;
        /// Move right.
        const RIGHT = 1 << 1;
        /// Jump.
        const JUMP = 1 << 2;
    }
}

/// Maps a key code (DOM `KeyboardEvent.code` convention) to its action.
///
/// The table is fixed: arrows and WASD for movement, with `Space`, `ArrowUp`
/// and `KeyW` all meaning jump.
#[must_use]
pub fn action_for_key(code: &str) -> Option<HeldActions> {
    match code {
        "ArrowLeft" | "KeyA" => Some(HeldActions::LEFT),
        "ArrowRight" | "KeyD" => Some(HeldActions::RIGHT),
        "ArrowUp" | "KeyW" | "Space" => Some(HeldActions::JUMP),
        _ => None,
    }
}

/// The set of actions currently held, fed by raw key events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    held: HeldActions,
}

impl InputState {
    /// Creates an empty input state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a key-down. Returns the mapped action, if the key is bound.
    pub fn press(&mut self, code: &str) -> Option<HeldActions> {
        let action = action_for_key(code)?;
        self.held.insert(action);
        Some(action)
    }

    /// Records a key-up.
    pub fn release(&mut self, code: &str) {
        if let Some(action) = action_for_key(code) {
            self.held.remove(action);
        }
    }

    /// Releases everything (level load / reset).
    pub fn clear(&mut self) {
        self.held = HeldActions::empty();
    }

    /// The currently held actions.
    #[must_use]
    pub fn held(&self) -> HeldActions {
        self.held
    }
}
