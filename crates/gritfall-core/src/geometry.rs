//! Axis-aligned geometry and collision resolution.
//!
//! Everything in the simulation with a spatial footprint — the actor, static
//! platforms, puzzle elements — shares the [`Rect`] shape. Collision handling
//! is two operations:
//!
//! - [`Rect::intersects`]: the AABB overlap test. Overlap is strict on both
//!   axes: rectangles that merely touch along an edge do NOT collide.
//! - [`resolve_collision`]: the minimum-translation resolver. Given an
//!   overlapping (moving, stationary) pair it computes the penetration depth
//!   on each axis and pushes the moving rectangle out along the axis of
//!   smaller overlap, reporting which face of the stationary rectangle was
//!   struck.
//!
//! This is a one-shot resolver, not a swept/continuous test: a sufficiently
//! fast body can tunnel through a thin rectangle between frames. That is an
//! accepted limitation of the model, bounded in practice by the frame-delta
//! cap in [`crate::physics`].
//!
//! The coordinate system is screen-like: `x` grows rightward, `y` grows
//! downward, so a rectangle's *top* edge has the smaller `y`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

// =============================================================================
// Rect
// =============================================================================

/// An axis-aligned rectangle.
///
/// `pos` is the top-left corner; `size` must be non-negative on both axes
/// (validated at the level-definition boundary, see
/// [`crate::level::LevelDefinition::validate`]).
///
/// # Example
///
/// ```
/// use gritfall_core::geometry::Rect;
///
/// let a = Rect::new(0.0, 0.0, 10.0, 10.0);
/// let b = Rect::new(5.0, 5.0, 10.0, 10.0);
/// let c = Rect::new(10.0, 0.0, 10.0, 10.0);
///
/// assert!(a.intersects(&b));
/// // Touching edges do not count as a collision.
/// assert!(!a.intersects(&c));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub pos: Vec2,
    /// Extent on each axis; non-negative.
    pub size: Vec2,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and extent.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Creates a rectangle from corner and size vectors.
    #[must_use]
    pub const fn from_corner_size(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// The `x` coordinate of the left edge.
    #[must_use]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    /// The `x` coordinate of the right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    /// The `y` coordinate of the top edge (screen coordinates: smaller `y`).
    #[must_use]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    /// The `y` coordinate of the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// The center point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Returns true iff the two rectangles overlap on both axes.
    ///
    /// The comparison is strict: rectangles whose edges exactly coincide do
    /// not intersect. This keeps a body resting flush against a surface from
    /// re-colliding every frame after resolution.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Returns true iff the two rectangles overlap *or* rest flush against
    /// each other.
    ///
    /// Collision resolution leaves a supported body exactly edge-to-edge
    /// with the surface under it, which [`Rect::intersects`] deliberately
    /// does not count. Contact-sensitive checks — is the actor standing on
    /// the goal platform? — use this inclusive variant instead.
    #[must_use]
    pub fn touches(&self, other: &Self) -> bool {
        self.left() <= other.right()
            && self.right() >= other.left()
            && self.top() <= other.bottom()
            && self.bottom() >= other.top()
    }
}

// =============================================================================
// Collision resolution
// =============================================================================

/// The face of the stationary rectangle struck during a collision.
///
/// Derived from the sign of the moving rectangle's position relative to the
/// stationary one on the resolved axis. [`Side::Top`] is the grounding case:
/// the mover landed on top of the stationary rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// The mover came to rest on the stationary rectangle's upper face.
    Top,
    /// The mover struck the underside (head bump).
    Bottom,
    /// The mover struck the left face.
    Left,
    /// The mover struck the right face.
    Right,
}

/// The outcome of resolving one overlapping pair.
///
/// `delta` is the signed displacement to apply to the moving rectangle so
/// that the pair no longer overlaps; `side` names the struck face of the
/// stationary rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Displacement to apply to the moving rectangle.
    pub delta: Vec2,
    /// Which face of the stationary rectangle was hit.
    pub side: Side,
}

/// Resolves an overlapping (moving, stationary) pair along the axis of least
/// penetration.
///
/// The penetration depth on each axis is the smaller of the two possible
/// push-out distances. The axis with the smaller overlap wins; on an exact
/// tie, vertical resolution wins — a body clipping a corner is treated as
/// landing rather than being shoved sideways.
///
/// Callers must only invoke this on pairs for which
/// [`Rect::intersects`] returns true; for disjoint pairs the computed
/// displacement is meaningless.
///
/// # Example
///
/// ```
/// use gritfall_core::geometry::{resolve_collision, Rect, Side};
///
/// // A body that sank 4 units into a floor.
/// let body = Rect::new(100.0, 348.0, 32.0, 32.0);
/// let floor = Rect::new(0.0, 376.0, 400.0, 20.0);
///
/// let resolution = resolve_collision(&body, &floor);
/// assert_eq!(resolution.side, Side::Top);
/// assert_eq!(resolution.delta.y, -4.0);
///
/// let corrected = Rect::from_corner_size(body.pos + resolution.delta, body.size);
/// assert!(!corrected.intersects(&floor));
/// ```
#[must_use]
pub fn resolve_collision(moving: &Rect, stationary: &Rect) -> Resolution {
    let overlap_x = f32::min(
        moving.right() - stationary.left(),
        stationary.right() - moving.left(),
    );
    let overlap_y = f32::min(
        moving.bottom() - stationary.top(),
        stationary.bottom() - moving.top(),
    );

    if overlap_x < overlap_y {
        if moving.pos.x < stationary.pos.x {
            Resolution {
                delta: Vec2::new(-overlap_x, 0.0),
                side: Side::Left,
            }
        } else {
            Resolution {
                delta: Vec2::new(overlap_x, 0.0),
                side: Side::Right,
            }
        }
    } else if moving.pos.y < stationary.pos.y {
        Resolution {
            delta: Vec2::new(0.0, -overlap_y),
            side: Side::Top,
        }
    } else {
        Resolution {
            delta: Vec2::new(0.0, overlap_y),
            side: Side::Bottom,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
