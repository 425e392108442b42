//! The simulation engine: the per-frame update pipeline.
//!
//! [`SimulationEngine`] owns the actor body, the active level's runtime
//! state, and the camera, and advances them one frame per `update` call. The
//! frame steps run in a fixed order — the order is load-bearing:
//!
//! 1. **INPUT**: held movement keys set or decay horizontal velocity
//! 2. **KINEMATICS**: moving platforms are repositioned for this frame
//! 3. **PHYSICS**: gravity, then movement integration, on the actor
//! 4. **COLLISION**: actor vs. static platforms, then moving platforms, then
//!    closed doors; grounding is recomputed from scratch
//! 5. **INTERACTIONS**: puzzle element triggers, then derived door state
//! 6. **CAMERA**: smoothed follow
//! 7. **TERMINAL**: fell-off-level and goal checks
//!
//! Resolving collisions before puzzle triggers means the actor interacts
//! from its settled position for the frame; deriving door state after
//! triggers means a switch pressed this frame opens its door this frame.
//!
//! # Execution model
//!
//! Single-threaded and cooperative: one `update(timestamp)` per display
//! refresh, driven by an external scheduler. Nothing blocks or spans frames,
//! and the engine is the sole mutator of simulation state between frames.
//! External influence enters only through the explicit entry points
//! (`load_level`, `reset`, `key_down`/`key_up`), and observations leave as
//! read-only snapshots and [`GameEvent`]s.
//!
//! # Failure semantics
//!
//! There are no recoverable runtime errors here. An unknown or invalid level
//! id is logged and ignored (`update` becomes a no-op until a valid load).
//! Falling off the level and touching spikes are intentional outcomes,
//! signaled through the event sink, never through panics or `Err`s.

use std::collections::BTreeSet;
use std::fmt;

use glam::Vec2;
use tracing::{debug, info, trace, warn};

use crate::camera::Camera;
use crate::events::{EventSink, GameEvent};
use crate::geometry::{resolve_collision, Rect, Side};
use crate::input::{HeldActions, InputState};
use crate::level::{ElementId, ElementKind, LevelDefinition};
use crate::physics::{self, Body, BASE_FRAME_MS};
use crate::puzzle::{RestoredState, RuntimeLevelState};

// =============================================================================
// Tuning constants
// =============================================================================

/// Horizontal speed while a movement key is held, in units per baseline
/// frame.
pub const MOVE_SPEED: f32 = 5.0;

/// Per-frame decay of horizontal velocity when no movement key is held.
pub const FRICTION: f32 = 0.8;

/// Vertical velocity applied at jump time (negative is up).
pub const JUMP_VELOCITY: f32 = -12.0;

/// The actor's hitbox extent.
pub const ACTOR_SIZE: Vec2 = Vec2::new(32.0, 32.0);

/// How far below the viewport the actor may fall before the run ends.
pub const FALL_MARGIN: f32 = 200.0;

/// Fraction of a moving platform's frame displacement applied to an actor
/// grounded on it, so the actor does not slide off a moving surface.
pub const PLATFORM_CARRY: f32 = 0.1;

/// Camera smoothing factor: fraction of the remaining distance closed per
/// frame.
pub const CAMERA_SMOOTHING: f32 = 0.1;

/// The actor's position before any level has been loaded.
const DEFAULT_START: Vec2 = Vec2::new(100.0, 300.0);

// =============================================================================
// SimulationEngine
// =============================================================================

/// The per-frame platformer simulation.
///
/// # Example
///
/// ```
/// use glam::Vec2;
/// use gritfall_core::{RecordingSink, RestoredState, SimulationEngine};
/// # use gritfall_core::level::{Difficulty, LevelDefinition, StaticPlatform};
/// # use gritfall_core::geometry::Rect;
/// # let level = LevelDefinition {
/// #     id: 1,
/// #     name: "Test".into(),
/// #     description: String::new(),
/// #     difficulty: Difficulty::Easy,
/// #     time_limit_secs: None,
/// #     player_start: Vec2::new(50.0, 350.0),
/// #     platforms: vec![StaticPlatform::new(Rect::new(0.0, 380.0, 400.0, 20.0), "#8B4513")],
/// #     elements: vec![],
/// # };
///
/// let sink = RecordingSink::new();
/// let mut engine = SimulationEngine::new(
///     Vec2::new(800.0, 600.0),
///     vec![level],
///     Box::new(sink.clone()),
/// );
///
/// engine.load_level(1, RestoredState::default());
/// for frame in 0..10 {
///     engine.update(f64::from(frame) * 16.67);
/// }
/// assert!(engine.actor().grounded);
/// ```
pub struct SimulationEngine {
    /// Viewport extent, used for camera centering and the fall-off check.
    viewport: Vec2,
    /// The level catalog supplied by the level-data collaborator.
    levels: Vec<LevelDefinition>,
    /// Receiver for gameplay events.
    sink: Box<dyn EventSink>,
    /// The single simulated body.
    actor: Body,
    /// Held-action set fed by raw key events.
    input: InputState,
    /// Smoothed camera.
    camera: Camera,
    /// The active run; `None` until a level loads.
    state: Option<RuntimeLevelState>,
    /// Timestamp of the previous `update`, for frame-delta computation.
    last_timestamp_ms: Option<f64>,
}

impl fmt::Debug for SimulationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationEngine")
            .field("viewport", &self.viewport)
            .field("levels", &self.levels.len())
            .field("actor", &self.actor)
            .field("camera", &self.camera)
            .field("state", &self.state)
            .field("last_timestamp_ms", &self.last_timestamp_ms)
            .finish_non_exhaustive()
    }
}

impl SimulationEngine {
    /// Creates an engine over a level catalog.
    ///
    /// The engine starts idle: `update` is a no-op until [`Self::load_level`]
    /// succeeds.
    #[must_use]
    pub fn new(viewport: Vec2, levels: Vec<LevelDefinition>, sink: Box<dyn EventSink>) -> Self {
        Self {
            viewport,
            levels,
            sink,
            actor: Body::new(Rect::from_corner_size(DEFAULT_START, ACTOR_SIZE)),
            input: InputState::new(),
            camera: Camera::new(),
            state: None,
            last_timestamp_ms: None,
        }
    }

    // -------------------------------------------------------------------------
    // Entry points
    // -------------------------------------------------------------------------

    /// Replaces the active run with a fresh instance of level `level_id`,
    /// applying externally persisted progress.
    ///
    /// The actor is repositioned to the restored checkpoint if one is
    /// supplied, else to the level's defined start; velocity, grounding,
    /// held input, and the camera are cleared.
    ///
    /// An unknown id or an invalid definition is a configuration error: it
    /// is logged and the call is a no-op, leaving any previous run intact.
    pub fn load_level(&mut self, level_id: u32, restored: RestoredState) {
        let Some(definition) = self.levels.iter().find(|l| l.id == level_id) else {
            warn!(level_id, "unknown level id; load ignored");
            return;
        };
        if let Err(error) = definition.validate() {
            warn!(level_id, %error, "invalid level definition; load ignored");
            return;
        }
        if definition.goal_platform().is_none() {
            warn!(level_id, "level has no goal platform and cannot be completed");
        }

        let state = RuntimeLevelState::from_definition(definition, &restored);
        info!(level_id, name = %definition.name, "loaded level");

        self.actor = Body::new(Rect::from_corner_size(state.spawn_point(), ACTOR_SIZE));
        self.camera.reset();
        self.input.clear();
        self.last_timestamp_ms = None;
        self.state = Some(state);
    }

    /// Restarts the current level from scratch.
    ///
    /// The actor returns to the active checkpoint (or the level start if
    /// none), with velocity, grounding, camera, held input, the goal flag,
    /// and all per-run collected/activated state cleared. To instead carry
    /// progress into the new attempt, call [`Self::load_level`] with a
    /// restored snapshot.
    pub fn reset(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        state.reset_run();
        self.actor = Body::new(Rect::from_corner_size(state.spawn_point(), ACTOR_SIZE));
        self.camera.reset();
        self.input.clear();
        self.last_timestamp_ms = None;
        debug!("run reset");
    }

    /// Feeds a raw key-down event.
    ///
    /// Movement keys join the held set. A jump key fires immediately when
    /// the actor is grounded: upward velocity is applied, grounding clears,
    /// and a jump event is emitted.
    pub fn key_down(&mut self, code: &str) {
        let Some(action) = self.input.press(code) else {
            return;
        };
        if action.contains(HeldActions::JUMP) && self.actor.grounded {
            self.actor.velocity.y = JUMP_VELOCITY;
            self.actor.grounded = false;
            debug!("actor jumped");
            self.emit(&GameEvent::Jump);
        }
    }

    /// Feeds a raw key-up event.
    pub fn key_up(&mut self, code: &str) {
        self.input.release(code);
    }

    /// Advances the simulation one frame.
    ///
    /// `timestamp_ms` is a monotonic wall-clock timestamp supplied by the
    /// external render-loop driver. The frame delta is clamped (see
    /// [`crate::physics::apply_movement`]) so a long stall cannot tunnel the
    /// actor through geometry. A no-op while no level is loaded.
    pub fn update(&mut self, timestamp_ms: f64) {
        let Some(state) = self.state.as_mut() else {
            trace!("update with no level loaded; ignoring");
            return;
        };

        #[allow(clippy::cast_possible_truncation)]
        let delta_ms = self
            .last_timestamp_ms
            .map_or(BASE_FRAME_MS, |prev| (timestamp_ms - prev) as f32);
        self.last_timestamp_ms = Some(timestamp_ms);

        // INPUT: held keys drive horizontal velocity.
        resolve_input(&mut self.actor, self.input.held());

        // KINEMATICS: platforms move to their position for this frame, so
        // the actor collides against current-frame geometry.
        #[allow(clippy::cast_possible_truncation)]
        state.advance_moving_platforms((timestamp_ms * 0.001) as f32);

        // PHYSICS: gravity then integration, actor only.
        physics::apply_gravity(&mut self.actor);
        physics::apply_movement(&mut self.actor, delta_ms);

        // COLLISION: grounding is recomputed from scratch every frame.
        resolve_world_collisions(&mut self.actor, state);

        // INTERACTIONS: triggers fire from the actor's settled position;
        // door state derives afterwards so this frame's switch opens its
        // door this frame.
        let mut events = state.apply_interactions(&self.actor.rect);

        // CAMERA: first-order low-pass toward centering the actor.
        self.camera
            .follow(self.actor.rect.pos - self.viewport * 0.5, CAMERA_SMOOTHING);

        // TERMINAL: fell off the level?
        if self.actor.rect.pos.y > self.viewport.y + FALL_MARGIN {
            debug!("actor fell off the level");
            events.push(GameEvent::GameOver);
        }

        // TERMINAL: goal touched for the first time this run? Resolution
        // leaves a supported actor flush against the surface, so this must
        // be a contact test, not a strict overlap test.
        let on_goal = state
            .goal_platform()
            .is_some_and(|goal| self.actor.rect.touches(&goal.rect));
        if on_goal && !state.goal_reached() {
            state.mark_goal_reached();
            debug!("goal reached");
            events.push(GameEvent::GoalReached);
        }

        for event in &events {
            self.emit(event);
        }
    }

    fn emit(&mut self, event: &GameEvent) {
        event.dispatch(self.sink.as_mut());
    }

    // -------------------------------------------------------------------------
    // Read accessors
    // -------------------------------------------------------------------------

    /// The viewport extent the engine was constructed with.
    #[must_use]
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// The actor body.
    #[must_use]
    pub fn actor(&self) -> &Body {
        &self.actor
    }

    /// The camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The definition of the active level, if one is loaded.
    #[must_use]
    pub fn current_level(&self) -> Option<&LevelDefinition> {
        self.state.as_ref().map(RuntimeLevelState::definition)
    }

    /// The active run's full state (elements, platforms, trigger sets), for
    /// the external renderer.
    #[must_use]
    pub fn run_state(&self) -> Option<&RuntimeLevelState> {
        self.state.as_ref()
    }

    /// Ids of keys collected this run.
    #[must_use]
    pub fn collected_keys(&self) -> Option<&BTreeSet<ElementId>> {
        self.state.as_ref().map(RuntimeLevelState::collected_keys)
    }

    /// Ids of switches and plates activated this run.
    #[must_use]
    pub fn activated_switches(&self) -> Option<&BTreeSet<ElementId>> {
        self.state
            .as_ref()
            .map(RuntimeLevelState::activated_switches)
    }

    /// The active respawn point, if a checkpoint has been touched.
    #[must_use]
    pub fn active_checkpoint(&self) -> Option<Vec2> {
        self.state.as_ref().and_then(RuntimeLevelState::checkpoint)
    }

    /// A snapshot of the per-run progress, in the shape `load_level` accepts
    /// back. This is what the external progress store persists between
    /// attempts.
    #[must_use]
    pub fn snapshot(&self) -> Option<RestoredState> {
        self.state.as_ref().map(|state| RestoredState {
            collected_keys: state.collected_keys().clone(),
            activated_switches: state.activated_switches().clone(),
            active_checkpoint: state.checkpoint(),
        })
    }
}

// =============================================================================
// Frame steps
// =============================================================================

/// Held movement keys set horizontal velocity directly; with neither held it
/// decays by the friction factor. Left wins if both are held.
fn resolve_input(actor: &mut Body, held: HeldActions) {
    if held.contains(HeldActions::LEFT) {
        actor.velocity.x = -MOVE_SPEED;
    } else if held.contains(HeldActions::RIGHT) {
        actor.velocity.x = MOVE_SPEED;
    } else {
        actor.velocity.x *= FRICTION;
    }
}

/// Resolves the actor against all solid geometry: static platforms, then
/// moving platforms, then closed doors. Open doors are not solid and are
/// skipped entirely.
fn resolve_world_collisions(actor: &mut Body, state: &RuntimeLevelState) {
    actor.grounded = false;

    for platform in state.platforms() {
        resolve_against(actor, &platform.rect, 0.0);
    }

    for element in state.elements() {
        if let ElementKind::MovingPlatform { frame_delta, .. } = &element.kind {
            resolve_against(actor, &element.rect, frame_delta.x);
        }
    }

    for element in state.elements() {
        if let ElementKind::Door { open: false } = &element.kind {
            resolve_against(actor, &element.rect, 0.0);
        }
    }
}

/// Resolves one overlapping obstacle: positional correction, velocity zeroed
/// perpendicular to the struck face, grounding on a top-face hit. A grounded
/// landing also carries the actor by a fraction of the obstacle's frame
/// displacement (zero for static geometry).
fn resolve_against(actor: &mut Body, obstacle: &Rect, carry_dx: f32) {
    if !actor.rect.intersects(obstacle) {
        return;
    }

    let resolution = resolve_collision(&actor.rect, obstacle);
    match resolution.side {
        Side::Top => {
            actor.grounded = true;
            actor.velocity.y = 0.0;
            actor.rect.pos.x += carry_dx * PLATFORM_CARRY;
        }
        Side::Bottom => actor.velocity.y = 0.0,
        Side::Left | Side::Right => actor.velocity.x = 0.0,
    }
    actor.rect.pos += resolution.delta;
}

// =============================================================================
// Tests
// =============================================================================
