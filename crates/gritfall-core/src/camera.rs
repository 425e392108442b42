//! Scripted camera with first-order smoothing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A camera that exponentially approaches its target.
///
/// `follow` is a first-order low-pass filter, not a snap: each frame the
/// camera closes a fixed fraction of the remaining distance to the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current top-left of the visible region, in world coordinates.
    pub position: Vec2,
}

impl Camera {
    /// Creates a camera at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves a fraction `smoothing` of the way toward `target`.
    pub fn follow(&mut self, target: Vec2, smoothing: f32) {
        self.position += (target - self.position) * smoothing;
    }

    /// Snaps back to the origin (level load / reset).
    pub fn reset(&mut self) {
        self.position = Vec2::ZERO;
    }
}
