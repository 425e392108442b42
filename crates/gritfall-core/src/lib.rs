//! # Gritfall Core
//!
//! Platformer simulation core for Gritfall.
//!
//! This crate provides the headless gameplay simulation: an actor under
//! gravity in a level of static platforms and stateful puzzle elements
//! (keys, switches, pressure plates, doors, moving platforms, spikes,
//! checkpoints), with a smoothed camera tracking the actor.
//!
//! ## Architecture
//!
//! - **Geometry**: axis-aligned rectangles, overlap tests, minimum-translation
//!   collision resolution ([`geometry`])
//! - **Physics**: gravity and delta-normalized movement integration for the
//!   actor body ([`physics`])
//! - **Levels**: immutable level definitions and element templates ([`level`])
//! - **Puzzle state**: the per-run mutable world — trigger sets, derived door
//!   state, element lifecycle ([`puzzle`])
//! - **Engine**: the per-frame update pipeline tying it all together
//!   ([`engine`])
//!
//! Presentation, audio, and progress stores are external collaborators: they
//! drive the engine through its entry points and observe it through the
//! [`events::EventSink`] interface and read-only snapshots. The core never
//! renders, plays audio, or persists anything itself.
//!
//! ## Usage
//!
//! ```
//! use glam::Vec2;
//! use gritfall_core::{RecordingSink, RestoredState, SimulationEngine};
//! use gritfall_core::level::{LevelDefinition, Difficulty, StaticPlatform};
//! use gritfall_core::geometry::Rect;
//!
//! let level = LevelDefinition {
//!     id: 1,
//!     name: "First Steps".into(),
//!     description: "Reach the goal platform.".into(),
//!     difficulty: Difficulty::Easy,
//!     time_limit_secs: None,
//!     player_start: Vec2::new(50.0, 350.0),
//!     platforms: vec![
//!         StaticPlatform::new(Rect::new(0.0, 380.0, 150.0, 20.0), "#8B4513"),
//!         StaticPlatform::goal(Rect::new(350.0, 300.0, 150.0, 20.0), "#4CAF50"),
//!     ],
//!     elements: vec![],
//! };
//!
//! let sink = RecordingSink::new();
//! let mut engine = SimulationEngine::new(
//!     Vec2::new(800.0, 600.0),
//!     vec![level],
//!     Box::new(sink.clone()),
//! );
//!
//! engine.load_level(1, RestoredState::default());
//! engine.update(16.67);
//! assert!(engine.current_level().is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod camera;
pub mod engine;
pub mod events;
pub mod geometry;
pub mod input;
pub mod level;
pub mod physics;
pub mod puzzle;

pub use camera::Camera;
pub use engine::SimulationEngine;
pub use events::{EventSink, GameEvent, NullSink, RecordingSink};
pub use geometry::{Rect, Resolution, Side};
pub use level::{Difficulty, ElementId, ElementKind, LevelDefinition, LevelError, MovePattern, PuzzleElement, StaticPlatform};
pub use physics::Body;
pub use puzzle::{RestoredState, RuntimeLevelState};

#[cfg(test)]
mod tests;
