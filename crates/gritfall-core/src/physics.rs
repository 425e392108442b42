//! Gravity and movement integration for the actor body.
//!
//! The physics model is arcade-style kinematics, not rigid-body dynamics:
//! a constant per-frame gravity increment with a terminal fall speed, and a
//! position integration normalized against a 60 Hz baseline so that actual
//! frame-rate variation does not change movement speed.
//!
//! Only the actor is integrated. Moving platforms are a pure function of
//! time (see [`crate::level::MovePattern`]) and are never fed through these
//! functions.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Downward velocity added to the actor each frame.
pub const GRAVITY: f32 = 0.8;

/// Terminal fall speed; `velocity.y` never exceeds this.
pub const MAX_FALL_SPEED: f32 = 15.0;

/// Baseline frame duration the integration is normalized against (60 Hz).
pub const BASE_FRAME_MS: f32 = 16.67;

/// Cap on the frame-delta factor. A long stall (e.g. the host tab being
/// backgrounded) advances the simulation by at most two baseline frames,
/// bounding tunneling through thin geometry.
pub const MAX_DELTA_FACTOR: f32 = 2.0;

/// A simulated point-mass-like body: the actor.
///
/// Holds the hitbox, the current velocity in units per baseline frame, and
/// the grounding flag. `grounded` is recomputed from scratch every frame
/// during collision resolution and must never be carried stale.
///
/// # Example
///
/// ```
/// use gritfall_core::geometry::Rect;
/// use gritfall_core::physics::{apply_gravity, Body, GRAVITY};
///
/// let mut body = Body::new(Rect::new(100.0, 300.0, 32.0, 32.0));
/// apply_gravity(&mut body);
/// assert_eq!(body.velocity.y, GRAVITY);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Position and hitbox extent.
    pub rect: Rect,
    /// Velocity in units per baseline frame.
    pub velocity: Vec2,
    /// True iff the most recent collision pass resolved against the top face
    /// of some platform or element.
    pub grounded: bool,
}

impl Body {
    /// Creates a body at rest, airborne.
    #[must_use]
    pub const fn new(rect: Rect) -> Self {
        Self {
            rect,
            velocity: Vec2::ZERO,
            grounded: false,
        }
    }
}

/// Applies one frame of gravity, clamped to [`MAX_FALL_SPEED`].
pub fn apply_gravity(body: &mut Body) {
    body.velocity.y += GRAVITY;
    if body.velocity.y > MAX_FALL_SPEED {
        body.velocity.y = MAX_FALL_SPEED;
    }
}

/// Integrates velocity into position, normalized against the 60 Hz baseline.
///
/// `factor = min(delta_ms / BASE_FRAME_MS, MAX_DELTA_FACTOR)`, then
/// `pos += velocity * factor`. Always succeeds; there are no error
/// conditions.
pub fn apply_movement(body: &mut Body, delta_ms: f32) {
    let factor = f32::min(delta_ms / BASE_FRAME_MS, MAX_DELTA_FACTOR);
    body.rect.pos += body.velocity * factor;
}
