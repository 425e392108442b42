//! Level definitions: the immutable blueprints the engine simulates.
//!
//! A [`LevelDefinition`] is owned by the level-content collaborator (see the
//! `gritfall-levels` crate) and consumed by the engine as read-only data.
//! On load the engine clones it into a [`crate::puzzle::RuntimeLevelState`];
//! the definition itself is never mutated.
//!
//! Puzzle elements are a tagged union ([`ElementKind`]): each variant carries
//! only the fields it needs, so effect application is an exhaustive match and
//! a new element type is a compile-time-checked exercise rather than a bag of
//! optional fields.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Rect;

// =============================================================================
// Element identity
// =============================================================================

/// Stable identifier for a puzzle element within a level.
///
/// Element ids come from level data (`"switch1"`, `"door1"`, ...) and are the
/// key under which runtime elements are stored, removed, and referenced by
/// trigger targets. Ordering is lexicographic, which gives the runtime
/// collection a deterministic iteration order.
///
/// # Example
///
/// ```
/// use gritfall_core::level::ElementId;
///
/// let id = ElementId::new("door1");
/// assert_eq!(id.as_str(), "door1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(String);

impl ElementId {
    /// Creates an element id from a string.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// =============================================================================
// Moving-platform kinematics
// =============================================================================

/// Oscillation pattern for a moving platform.
///
/// Position is a pure function of time — there is no stored velocity and
/// therefore no accumulated drift: the platform's location is exactly
/// reproducible from the frame timestamp alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovePattern {
    /// One end of the oscillation.
    pub start: Vec2,
    /// The other end of the oscillation.
    pub end: Vec2,
    /// Angular rate of the oscillation in radians per second.
    pub speed: f32,
}

impl MovePattern {
    /// The platform's position at wall-clock time `t_secs`.
    ///
    /// The progress along the segment is `(1 - cos(t * speed)) / 2` on both
    /// axes: a smooth, periodic, reversible sweep with period
    /// `2π / speed`, phase-aligned so the cycle begins at `start`.
    ///
    /// # Example
    ///
    /// ```
    /// use glam::Vec2;
    /// use gritfall_core::level::MovePattern;
    ///
    /// let pattern = MovePattern {
    ///     start: Vec2::new(200.0, 360.0),
    ///     end: Vec2::new(350.0, 360.0),
    ///     speed: 2.0,
    /// };
    /// assert_eq!(pattern.position_at(0.0), pattern.start);
    /// ```
    #[must_use]
    pub fn position_at(&self, t_secs: f32) -> Vec2 {
        let progress = (1.0 - (t_secs * self.speed).cos()) * 0.5;
        self.start + (self.end - self.start) * progress
    }
}

// =============================================================================
// Platforms and elements
// =============================================================================

/// A static platform: solid, immutable for the lifetime of a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticPlatform {
    /// Footprint of the platform.
    pub rect: Rect,
    /// Display color, passed through to the external renderer.
    pub color: String,
    /// True for the level's goal platform; at most one per level.
    pub is_goal: bool,
}

impl StaticPlatform {
    /// Creates an ordinary (non-goal) platform.
    #[must_use]
    pub fn new(rect: Rect, color: &str) -> Self {
        Self {
            rect,
            color: color.to_string(),
            is_goal: false,
        }
    }

    /// Creates the goal platform.
    #[must_use]
    pub fn goal(rect: Rect, color: &str) -> Self {
        Self {
            rect,
            color: color.to_string(),
            is_goal: true,
        }
    }
}

/// Variant-specific state of a puzzle element.
///
/// Runtime flags (`active`, `open`, `frame_delta`) start in their inert state
/// in level templates and are only ever flipped on the runtime clone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    /// A collectible key. One-shot: collected on first contact and removed
    /// from the world. `target` names the door it unlocks.
    Key {
        /// Door this key opens, if any.
        target: Option<ElementId>,
    },
    /// A switch. Latches on first contact and stays in the world.
    Switch {
        /// Door this switch opens, if any.
        target: Option<ElementId>,
        /// True once triggered; never resets within a run.
        active: bool,
    },
    /// A pressure plate. Same latch behavior as a switch.
    PressurePlate {
        /// Door this plate opens, if any.
        target: Option<ElementId>,
        /// True once triggered; never resets within a run.
        active: bool,
    },
    /// A door: solid while closed, passable once open. `open` is a derived
    /// value recomputed every frame from the trigger sets, never set
    /// independently.
    Door {
        /// True iff some trigger targeting this door has fired.
        open: bool,
    },
    /// A platform oscillating between two endpoints.
    MovingPlatform {
        /// The oscillation this platform follows.
        pattern: MovePattern,
        /// Displacement applied at the most recent kinematics step; zero in
        /// templates. Used to carry a grounded actor along.
        frame_delta: Vec2,
    },
    /// Instantly fatal on contact.
    Spike,
    /// Becomes the active respawn point on first contact.
    Checkpoint,
}

/// A puzzle element: footprint, identity, display color, and variant state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleElement {
    /// Stable id, unique within the level.
    pub id: ElementId,
    /// Current footprint. Mutable at runtime only for moving platforms.
    pub rect: Rect,
    /// Display color, passed through to the external renderer.
    pub color: String,
    /// Variant-specific state.
    pub kind: ElementKind,
}

impl PuzzleElement {
    /// Creates an element from its parts.
    #[must_use]
    pub fn new(id: &str, rect: Rect, color: &str, kind: ElementKind) -> Self {
        Self {
            id: ElementId::new(id),
            rect,
            color: color.to_string(),
            kind,
        }
    }

    /// Creates a key unlocking `target`.
    #[must_use]
    pub fn key(id: &str, rect: Rect, color: &str, target: &str) -> Self {
        Self::new(
            id,
            rect,
            color,
            ElementKind::Key {
                target: Some(ElementId::new(target)),
            },
        )
    }

    /// Creates an inactive switch opening `target`.
    #[must_use]
    pub fn switch(id: &str, rect: Rect, color: &str, target: &str) -> Self {
        Self::new(
            id,
            rect,
            color,
            ElementKind::Switch {
                target: Some(ElementId::new(target)),
                active: false,
            },
        )
    }

    /// Creates an inactive pressure plate opening `target`.
    #[must_use]
    pub fn pressure_plate(id: &str, rect: Rect, color: &str, target: &str) -> Self {
        Self::new(
            id,
            rect,
            color,
            ElementKind::PressurePlate {
                target: Some(ElementId::new(target)),
                active: false,
            },
        )
    }

    /// Creates a closed door.
    #[must_use]
    pub fn door(id: &str, rect: Rect, color: &str) -> Self {
        Self::new(id, rect, color, ElementKind::Door { open: false })
    }

    /// Creates a moving platform following `pattern`. The rectangle's
    /// position should equal `pattern.start`.
    #[must_use]
    pub fn moving_platform(id: &str, rect: Rect, color: &str, pattern: MovePattern) -> Self {
        Self::new(
            id,
            rect,
            color,
            ElementKind::MovingPlatform {
                pattern,
                frame_delta: Vec2::ZERO,
            },
        )
    }

    /// Creates a spike strip.
    #[must_use]
    pub fn spike(id: &str, rect: Rect, color: &str) -> Self {
        Self::new(id, rect, color, ElementKind::Spike)
    }

    /// Creates a checkpoint.
    #[must_use]
    pub fn checkpoint(id: &str, rect: Rect, color: &str) -> Self {
        Self::new(id, rect, color, ElementKind::Checkpoint)
    }

    /// The door this element triggers, if it is a trigger with a target.
    #[must_use]
    pub fn trigger_target(&self) -> Option<&ElementId> {
        match &self.kind {
            ElementKind::Key { target }
            | ElementKind::Switch { target, .. }
            | ElementKind::PressurePlate { target, .. } => target.as_ref(),
            _ => None,
        }
    }

    /// Latches the `active` flag on switches and pressure plates; no-op for
    /// every other variant.
    pub(crate) fn set_active(&mut self) {
        if let ElementKind::Switch { active, .. } | ElementKind::PressurePlate { active, .. } =
            &mut self.kind
        {
            *active = true;
        }
    }
}

// =============================================================================
// Level definition
// =============================================================================

/// Difficulty rating attached to a level for the level-select collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    /// Tutorial-grade.
    Easy,
    /// Some coordination required.
    Medium,
    /// Demanding execution.
    Hard,
    /// The deep end.
    Expert,
}

/// Errors found when validating a level definition.
///
/// These are configuration errors in the sense of the failure policy: the
/// engine logs them and refuses the load rather than crashing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    /// Two elements share an id.
    #[error("duplicate element id `{0}`")]
    DuplicateElementId(ElementId),
    /// More than one platform is flagged as the goal.
    #[error("level has {0} goal platforms, at most one is allowed")]
    MultipleGoalPlatforms(usize),
    /// A platform has a negative extent.
    #[error("platform {0} has a negative extent")]
    NegativePlatformSize(usize),
    /// An element has a negative extent.
    #[error("element `{0}` has a negative extent")]
    NegativeElementSize(ElementId),
    /// A trigger names a target that is not a door in this level.
    #[error("trigger `{trigger}` targets `{target}`, which is not a door in this level")]
    UnknownTriggerTarget {
        /// The offending trigger element.
        trigger: ElementId,
        /// The target id that resolved to nothing.
        target: ElementId,
    },
}

/// The immutable blueprint of a level.
///
/// Owned by the level-content collaborator; the engine clones it into
/// mutable runtime state on load and treats the original as read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// Stable numeric id used by `load_level`.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// One-line description for the level-select screen.
    pub description: String,
    /// Difficulty rating.
    pub difficulty: Difficulty,
    /// Optional completion time limit, enforced by an external collaborator.
    pub time_limit_secs: Option<f32>,
    /// Where the actor spawns when no checkpoint is active.
    pub player_start: Vec2,
    /// Static geometry, in draw order.
    pub platforms: Vec<StaticPlatform>,
    /// Puzzle element templates, in draw order.
    pub elements: Vec<PuzzleElement>,
}

impl LevelDefinition {
    /// Checks the structural invariants of this definition.
    ///
    /// Verified: element ids are unique, at most one platform is the goal,
    /// all extents are non-negative, and every trigger target names a door
    /// present in the level.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), LevelError> {
        let mut seen = std::collections::BTreeSet::new();
        for element in &self.elements {
            if !seen.insert(&element.id) {
                return Err(LevelError::DuplicateElementId(element.id.clone()));
            }
            if element.rect.size.x < 0.0 || element.rect.size.y < 0.0 {
                return Err(LevelError::NegativeElementSize(element.id.clone()));
            }
        }

        let goal_count = self.platforms.iter().filter(|p| p.is_goal).count();
        if goal_count > 1 {
            return Err(LevelError::MultipleGoalPlatforms(goal_count));
        }

        for (index, platform) in self.platforms.iter().enumerate() {
            if platform.rect.size.x < 0.0 || platform.rect.size.y < 0.0 {
                return Err(LevelError::NegativePlatformSize(index));
            }
        }

        for element in &self.elements {
            if let Some(target) = element.trigger_target() {
                let is_door = self.elements.iter().any(|other| {
                    other.id == *target && matches!(other.kind, ElementKind::Door { .. })
                });
                if !is_door {
                    return Err(LevelError::UnknownTriggerTarget {
                        trigger: element.id.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// The goal platform, if this level has one.
    #[must_use]
    pub fn goal_platform(&self) -> Option<&StaticPlatform> {
        self.platforms.iter().find(|p| p.is_goal)
    }
}

// =============================================================================
// Tests
// =============================================================================
