//! The discrete event interface between the engine and its collaborators.
//!
//! The engine mutates simulation state every frame and reports the things
//! that *happened* — jumps, pickups, activations, terminal outcomes — as
//! discrete events through an [`EventSink`]. Presentation plays sounds and
//! particles off these, the progress store persists pickups, and the phase
//! controller reacts to the terminal ones. Nothing ever flows back through
//! this interface; collaborators influence the engine only via its explicit
//! entry points.

use std::sync::{Arc, Mutex};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::level::ElementId;

/// A discrete gameplay event emitted during a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// The run ended: the actor fell off the level or touched a spike.
    GameOver,
    /// The actor left the ground under jump input.
    Jump,
    /// The actor touched the goal platform for the first time this run.
    GoalReached,
    /// A key was picked up (and removed from the world).
    KeyCollected(ElementId),
    /// A switch or pressure plate latched on.
    SwitchActivated(ElementId),
    /// A checkpoint became the active respawn point.
    CheckpointReached(Vec2),
}

impl GameEvent {
    /// Routes this event to the matching sink callback.
    pub fn dispatch(&self, sink: &mut dyn EventSink) {
        match self {
            Self::GameOver => sink.on_game_over(),
            Self::Jump => sink.on_jump(),
            Self::GoalReached => sink.on_goal_reached(),
            Self::KeyCollected(id) => sink.on_key_collected(id),
            Self::SwitchActivated(id) => sink.on_switch_activated(id),
            Self::CheckpointReached(position) => sink.on_checkpoint_reached(*position),
        }
    }
}

/// Receiver for engine events.
///
/// All methods default to no-ops so collaborators only implement what they
/// care about.
pub trait EventSink: Send {
    /// The run ended (fall or spike).
    fn on_game_over(&mut self) {}
    /// The actor jumped.
    fn on_jump(&mut self) {}
    /// The goal platform was reached.
    fn on_goal_reached(&mut self) {}
    /// A key was collected.
    fn on_key_collected(&mut self, _id: &ElementId) {}
    /// A switch or pressure plate was activated.
    fn on_switch_activated(&mut self, _id: &ElementId) {}
    /// A checkpoint became the active respawn point.
    fn on_checkpoint_reached(&mut self, _position: Vec2) {}
}

/// A sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {}

/// A sink that records every event for later inspection.
///
/// The log lives behind an `Arc<Mutex<_>>` so a clone of the sink can be
/// handed to the engine while the test (or replay recorder) keeps its own
/// handle to drain.
///
/// # Example
///
/// ```
/// use gritfall_core::events::{EventSink, GameEvent, RecordingSink};
///
/// let sink = RecordingSink::new();
/// let mut handle = sink.clone();
/// handle.on_jump();
///
/// assert_eq!(sink.take_events(), vec![GameEvent::Jump]);
/// assert!(sink.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<GameEvent>>>,
}

impl RecordingSink {
    /// Creates a sink with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains and returns all recorded events in emission order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned (should not happen under
    /// normal circumstances).
    #[must_use]
    pub fn take_events(&self) -> Vec<GameEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    /// Number of events currently recorded.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// True if no events are recorded.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }

    /// Drops all recorded events.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    fn record(&self, event: GameEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl EventSink for RecordingSink {
    fn on_game_over(&mut self) {
        self.record(GameEvent::GameOver);
    }

    fn on_jump(&mut self) {
        self.record(GameEvent::Jump);
    }

    fn on_goal_reached(&mut self) {
        self.record(GameEvent::GoalReached);
    }

    fn on_key_collected(&mut self, id: &ElementId) {
        self.record(GameEvent::KeyCollected(id.clone()));
    }

    fn on_switch_activated(&mut self, id: &ElementId) {
        self.record(GameEvent::SwitchActivated(id.clone()));
    }

    fn on_checkpoint_reached(&mut self, position: Vec2) {
        self.record(GameEvent::CheckpointReached(position));
    }
}
