//! Per-run mutable level state and the puzzle-element state machine.
//!
//! [`RuntimeLevelState`] is the engine's working copy of a level: the element
//! collection (keyed by stable id so keys can be removed mid-simulation
//! without disturbing iteration or other elements' identity), the trigger
//! sets, the active checkpoint, and the goal flag. It is created on level
//! load, mutated every frame, and discarded wholesale on the next load or
//! reset.
//!
//! # Door state is derived
//!
//! A door's `open` flag is never set from an event. It is recomputed every
//! frame as a pure function of the immutable definition's trigger templates
//! and the current trigger sets: a door is open iff some key, switch, or
//! pressure plate whose `target` names it has been triggered (logical OR
//! across all matching triggers). The derivation reads the *templates*
//! rather than the live collection, so a key that has been collected and
//! removed from the world still holds its door open. Trigger sets only ever
//! grow within a run, so doors open monotonically and never re-close without
//! a reload.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::GameEvent;
use crate::geometry::Rect;
use crate::level::{ElementId, ElementKind, LevelDefinition, PuzzleElement, StaticPlatform};

// =============================================================================
// Restored state
// =============================================================================

/// Externally persisted per-level progress, re-supplied on `load_level`.
///
/// The default value is a fresh run: nothing collected, nothing activated,
/// no checkpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestoredState {
    /// Ids of keys already collected in a prior attempt.
    pub collected_keys: BTreeSet<ElementId>,
    /// Ids of switches and plates already activated in a prior attempt.
    pub activated_switches: BTreeSet<ElementId>,
    /// The respawn point carried over from a prior attempt, if any.
    pub active_checkpoint: Option<Vec2>,
}

// =============================================================================
// Runtime level state
// =============================================================================

/// The mutable world for one play-through of a level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeLevelState {
    /// Owned clone of the blueprint; platforms and element templates are
    /// read from here and never mutated.
    definition: LevelDefinition,
    /// Live elements, keyed by stable id. Keys are removed on pickup;
    /// moving-platform rectangles are advanced each frame.
    elements: BTreeMap<ElementId, PuzzleElement>,
    /// Ids of keys collected this run (including restored ones).
    collected_keys: BTreeSet<ElementId>,
    /// Ids of switches/plates activated this run (including restored ones).
    activated_switches: BTreeSet<ElementId>,
    /// Active respawn point, if a checkpoint has been touched.
    checkpoint: Option<Vec2>,
    /// Latches true on first contact with the goal platform.
    goal_reached: bool,
}

impl RuntimeLevelState {
    /// Builds the runtime state for a level, applying restored progress.
    ///
    /// Restored keys are removed from the element collection up front — a
    /// collected key must never be collidable or visible again for this
    /// level instance. Restored switches are re-armed so their visual state
    /// matches, and doors they target start open.
    #[must_use]
    pub fn from_definition(definition: &LevelDefinition, restored: &RestoredState) -> Self {
        let mut elements = Self::element_map(definition);

        for id in &restored.collected_keys {
            if matches!(
                elements.get(id).map(|e| &e.kind),
                Some(ElementKind::Key { .. })
            ) {
                elements.remove(id);
            }
        }
        for id in &restored.activated_switches {
            if let Some(element) = elements.get_mut(id) {
                element.set_active();
            }
        }

        let mut state = Self {
            definition: definition.clone(),
            elements,
            collected_keys: restored.collected_keys.clone(),
            activated_switches: restored.activated_switches.clone(),
            checkpoint: restored.active_checkpoint,
            goal_reached: false,
        };
        state.refresh_doors();
        state
    }

    fn element_map(definition: &LevelDefinition) -> BTreeMap<ElementId, PuzzleElement> {
        definition
            .elements
            .iter()
            .map(|e| (e.id.clone(), e.clone()))
            .collect()
    }

    /// Restarts the run from scratch: trigger sets cleared, elements rebuilt
    /// from the definition, goal flag cleared. The active checkpoint is kept
    /// — the respawn point survives a death.
    pub fn reset_run(&mut self) {
        self.collected_keys.clear();
        self.activated_switches.clear();
        self.goal_reached = false;
        let elements = Self::element_map(&self.definition);
        self.elements = elements;
        self.refresh_doors();
    }

    // -------------------------------------------------------------------------
    // Per-frame steps
    // -------------------------------------------------------------------------

    /// Recomputes every moving platform's position for time `t_secs`,
    /// recording the frame-over-frame displacement used to carry a grounded
    /// actor along.
    ///
    /// Runs before collision handling so the actor always collides against
    /// the platform's current-frame position.
    pub fn advance_moving_platforms(&mut self, t_secs: f32) {
        for element in self.elements.values_mut() {
            if let ElementKind::MovingPlatform {
                pattern,
                frame_delta,
            } = &mut element.kind
            {
                let next = pattern.position_at(t_secs);
                *frame_delta = next - element.rect.pos;
                element.rect.pos = next;
            }
        }
    }

    /// Applies every puzzle interaction for an actor at `actor_rect`, then
    /// refreshes derived door state. Returns the events produced, in element
    /// id order.
    ///
    /// Each "newly triggered" transition fires exactly once: keys are
    /// removed on pickup, switches and plates latch, checkpoints only fire
    /// when the respawn point actually changes. Spikes are the exception —
    /// contact is fatal every frame, with no de-duplication, since the
    /// outcome is a phase transition out of play anyway.
    pub fn apply_interactions(&mut self, actor_rect: &Rect) -> Vec<GameEvent> {
        let mut events = Vec::new();

        let overlapping: Vec<ElementId> = self
            .elements
            .values()
            .filter(|e| actor_rect.intersects(&e.rect))
            .map(|e| e.id.clone())
            .collect();

        for id in overlapping {
            let Some(element) = self.elements.get(&id) else {
                continue;
            };
            let position = element.rect.pos;

            match element.kind {
                ElementKind::Key { .. } => {
                    if !self.collected_keys.contains(&id) {
                        self.collected_keys.insert(id.clone());
                        self.elements.remove(&id);
                        debug!(key = %id, "key collected");
                        events.push(GameEvent::KeyCollected(id));
                    }
                }
                ElementKind::Switch { .. } | ElementKind::PressurePlate { .. } => {
                    if self.activated_switches.insert(id.clone()) {
                        if let Some(element) = self.elements.get_mut(&id) {
                            element.set_active();
                        }
                        debug!(switch = %id, "switch activated");
                        events.push(GameEvent::SwitchActivated(id));
                    }
                }
                ElementKind::Checkpoint => {
                    if self.checkpoint != Some(position) {
                        self.checkpoint = Some(position);
                        debug!(x = position.x, y = position.y, "checkpoint reached");
                        events.push(GameEvent::CheckpointReached(position));
                    }
                }
                ElementKind::Spike => {
                    events.push(GameEvent::GameOver);
                }
                // Doors and moving platforms are solid geometry, handled by
                // the collision pass.
                ElementKind::Door { .. } | ElementKind::MovingPlatform { .. } => {}
            }
        }

        self.refresh_doors();
        events
    }

    /// Recomputes every door's `open` flag from the trigger sets.
    fn refresh_doors(&mut self) {
        let mut open_targets: BTreeSet<ElementId> = BTreeSet::new();
        for template in &self.definition.elements {
            let triggered = self.collected_keys.contains(&template.id)
                || self.activated_switches.contains(&template.id);
            if triggered {
                if let Some(target) = template.trigger_target() {
                    open_targets.insert(target.clone());
                }
            }
        }

        for element in self.elements.values_mut() {
            if let ElementKind::Door { open } = &mut element.kind {
                *open = open_targets.contains(&element.id);
            }
        }
    }

    /// Latches the goal flag. Idempotent; the engine fires the event only on
    /// the first call per run.
    pub fn mark_goal_reached(&mut self) {
        self.goal_reached = true;
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The blueprint this run was created from.
    #[must_use]
    pub fn definition(&self) -> &LevelDefinition {
        &self.definition
    }

    /// The static platforms of this level.
    #[must_use]
    pub fn platforms(&self) -> &[StaticPlatform] {
        &self.definition.platforms
    }

    /// Live elements in id order.
    pub fn elements(&self) -> impl Iterator<Item = &PuzzleElement> + '_ {
        self.elements.values()
    }

    /// A live element by id, if it is still in the world.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&PuzzleElement> {
        self.elements.get(id)
    }

    /// Number of live elements.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Ids of keys collected this run.
    #[must_use]
    pub fn collected_keys(&self) -> &BTreeSet<ElementId> {
        &self.collected_keys
    }

    /// Ids of switches and plates activated this run.
    #[must_use]
    pub fn activated_switches(&self) -> &BTreeSet<ElementId> {
        &self.activated_switches
    }

    /// The active respawn point, if a checkpoint has been touched.
    #[must_use]
    pub fn checkpoint(&self) -> Option<Vec2> {
        self.checkpoint
    }

    /// True once the goal platform has been touched this run.
    #[must_use]
    pub fn goal_reached(&self) -> bool {
        self.goal_reached
    }

    /// The goal platform, if the level has one.
    #[must_use]
    pub fn goal_platform(&self) -> Option<&StaticPlatform> {
        self.definition.goal_platform()
    }

    /// Where the actor should (re)spawn: the active checkpoint if one
    /// exists, else the level's defined start.
    #[must_use]
    pub fn spawn_point(&self) -> Vec2 {
        self.checkpoint.unwrap_or(self.definition.player_start)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{Difficulty, MovePattern};

    fn level_with(elements: Vec<PuzzleElement>) -> LevelDefinition {
        LevelDefinition {
            id: 1,
            name: "Test".into(),
            description: String::new(),
            difficulty: Difficulty::Easy,
            time_limit_secs: None,
            player_start: Vec2::new(50.0, 350.0),
            platforms: vec![
                StaticPlatform::new(Rect::new(0.0, 380.0, 400.0, 20.0), "#8B4513"),
                StaticPlatform::goal(Rect::new(600.0, 340.0, 150.0, 20.0), "#4CAF50"),
            ],
            elements,
        }
    }

    fn fresh(elements: Vec<PuzzleElement>) -> RuntimeLevelState {
        RuntimeLevelState::from_definition(&level_with(elements), &RestoredState::default())
    }

    fn door_open(state: &RuntimeLevelState, id: &str) -> bool {
        matches!(
            state.element(&ElementId::new(id)).map(|e| &e.kind),
            Some(ElementKind::Door { open: true })
        )
    }

    mod key_tests {
        use super::*;

        #[test]
        fn key_collects_exactly_once() {
            let key_rect = Rect::new(60.0, 340.0, 15.0, 15.0);
            let mut state = fresh(vec![
                PuzzleElement::key("key1", key_rect, "#FFD700", "door1"),
                PuzzleElement::door("door1", Rect::new(520.0, 320.0, 20.0, 60.0), "#8B4513"),
            ]);

            let actor = Rect::new(55.0, 330.0, 32.0, 32.0);
            let first = state.apply_interactions(&actor);
            let second = state.apply_interactions(&actor);

            assert_eq!(
                first,
                vec![GameEvent::KeyCollected(ElementId::new("key1"))]
            );
            assert!(second.is_empty());
            assert!(state.element(&ElementId::new("key1")).is_none());
            assert!(state.collected_keys().contains(&ElementId::new("key1")));
        }
    }

    mod switch_tests {
        use super::*;

        fn switch_and_door() -> Vec<PuzzleElement> {
            vec![
                PuzzleElement::switch(
                    "switch1",
                    Rect::new(60.0, 340.0, 20.0, 20.0),
                    "#FF0000",
                    "door1",
                ),
                PuzzleElement::door("door1", Rect::new(520.0, 320.0, 20.0, 60.0), "#8B4513"),
            ]
        }

        #[test]
        fn switch_latches_and_stays_in_world() {
            let mut state = fresh(switch_and_door());
            let actor = Rect::new(55.0, 330.0, 32.0, 32.0);

            let first = state.apply_interactions(&actor);
            let second = state.apply_interactions(&actor);

            assert_eq!(
                first,
                vec![GameEvent::SwitchActivated(ElementId::new("switch1"))]
            );
            assert!(second.is_empty());

            let element = state.element(&ElementId::new("switch1")).unwrap();
            assert!(matches!(
                element.kind,
                ElementKind::Switch { active: true, .. }
            ));
        }

        #[test]
        fn door_opens_when_its_trigger_fires() {
            let mut state = fresh(switch_and_door());
            assert!(!door_open(&state, "door1"));

            let actor = Rect::new(55.0, 330.0, 32.0, 32.0);
            state.apply_interactions(&actor);

            assert!(door_open(&state, "door1"));
        }

        #[test]
        fn door_ignores_unrelated_triggers() {
            let mut elements = switch_and_door();
            elements.push(PuzzleElement::door(
                "door2",
                Rect::new(560.0, 320.0, 20.0, 60.0),
                "#8B4513",
            ));
            let mut state = fresh(elements);

            let actor = Rect::new(55.0, 330.0, 32.0, 32.0);
            state.apply_interactions(&actor);

            assert!(door_open(&state, "door1"));
            assert!(!door_open(&state, "door2"));
        }

        #[test]
        fn door_stays_open_after_trigger_key_is_removed() {
            let mut state = fresh(vec![
                PuzzleElement::key("key1", Rect::new(60.0, 340.0, 15.0, 15.0), "#FFD700", "door1"),
                PuzzleElement::door("door1", Rect::new(520.0, 320.0, 20.0, 60.0), "#8B4513"),
            ]);

            let actor = Rect::new(55.0, 330.0, 32.0, 32.0);
            state.apply_interactions(&actor);
            assert!(state.element(&ElementId::new("key1")).is_none());
            assert!(door_open(&state, "door1"));

            // Further frames keep deriving the same open state.
            let away = Rect::new(300.0, 100.0, 32.0, 32.0);
            state.apply_interactions(&away);
            assert!(door_open(&state, "door1"));
        }

        #[test]
        fn either_of_two_triggers_opens_the_door() {
            let mut state = fresh(vec![
                PuzzleElement::switch(
                    "switch1",
                    Rect::new(60.0, 340.0, 20.0, 20.0),
                    "#FF0000",
                    "door1",
                ),
                PuzzleElement::switch(
                    "switch2",
                    Rect::new(200.0, 340.0, 20.0, 20.0),
                    "#FF0000",
                    "door1",
                ),
                PuzzleElement::door("door1", Rect::new(520.0, 320.0, 20.0, 60.0), "#8B4513"),
            ]);

            // Only the second switch fires; the door still opens.
            let actor = Rect::new(195.0, 330.0, 32.0, 32.0);
            state.apply_interactions(&actor);
            assert!(door_open(&state, "door1"));
        }
    }

    mod checkpoint_tests {
        use super::*;

        #[test]
        fn checkpoint_fires_once_per_position() {
            let mut state = fresh(vec![PuzzleElement::checkpoint(
                "checkpoint1",
                Rect::new(60.0, 340.0, 20.0, 20.0),
                "#00BCD4",
            )]);

            let actor = Rect::new(55.0, 330.0, 32.0, 32.0);
            let first = state.apply_interactions(&actor);
            let second = state.apply_interactions(&actor);

            assert_eq!(
                first,
                vec![GameEvent::CheckpointReached(Vec2::new(60.0, 340.0))]
            );
            assert!(second.is_empty());
            assert_eq!(state.checkpoint(), Some(Vec2::new(60.0, 340.0)));
            assert_eq!(state.spawn_point(), Vec2::new(60.0, 340.0));
        }

        #[test]
        fn second_checkpoint_replaces_the_first() {
            let mut state = fresh(vec![
                PuzzleElement::checkpoint(
                    "checkpoint1",
                    Rect::new(60.0, 340.0, 20.0, 20.0),
                    "#00BCD4",
                ),
                PuzzleElement::checkpoint(
                    "checkpoint2",
                    Rect::new(300.0, 340.0, 20.0, 20.0),
                    "#00BCD4",
                ),
            ]);

            state.apply_interactions(&Rect::new(55.0, 330.0, 32.0, 32.0));
            let events = state.apply_interactions(&Rect::new(295.0, 330.0, 32.0, 32.0));

            assert_eq!(
                events,
                vec![GameEvent::CheckpointReached(Vec2::new(300.0, 340.0))]
            );
            assert_eq!(state.spawn_point(), Vec2::new(300.0, 340.0));
        }
    }

    mod spike_tests {
        use super::*;

        #[test]
        fn spike_is_fatal_every_frame() {
            let mut state = fresh(vec![PuzzleElement::spike(
                "spike1",
                Rect::new(60.0, 360.0, 60.0, 20.0),
                "#E91E63",
            )]);

            let actor = Rect::new(55.0, 340.0, 32.0, 32.0);
            assert_eq!(state.apply_interactions(&actor), vec![GameEvent::GameOver]);
            assert_eq!(state.apply_interactions(&actor), vec![GameEvent::GameOver]);
        }
    }

    mod moving_platform_tests {
        use super::*;

        fn platform() -> PuzzleElement {
            PuzzleElement::moving_platform(
                "moving1",
                Rect::new(200.0, 360.0, 80.0, 15.0),
                "#9C27B0",
                MovePattern {
                    start: Vec2::new(200.0, 360.0),
                    end: Vec2::new(350.0, 360.0),
                    speed: 2.0,
                },
            )
        }

        #[test]
        fn advance_updates_position_and_frame_delta() {
            let mut state = fresh(vec![platform()]);

            state.advance_moving_platforms(0.0);
            let at_start = state.element(&ElementId::new("moving1")).unwrap().rect.pos;
            assert_eq!(at_start, Vec2::new(200.0, 360.0));

            state.advance_moving_platforms(0.5);
            let element = state.element(&ElementId::new("moving1")).unwrap();
            assert!(element.rect.pos.x > 200.0);

            let ElementKind::MovingPlatform { frame_delta, .. } = &element.kind else {
                panic!("expected a moving platform");
            };
            assert!((frame_delta.x - (element.rect.pos.x - 200.0)).abs() < 0.001);
            assert_eq!(frame_delta.y, 0.0);
        }
    }

    mod lifecycle_tests {
        use super::*;

        fn elements() -> Vec<PuzzleElement> {
            vec![
                PuzzleElement::key("key1", Rect::new(60.0, 340.0, 15.0, 15.0), "#FFD700", "door1"),
                PuzzleElement::switch(
                    "switch1",
                    Rect::new(200.0, 340.0, 20.0, 20.0),
                    "#FF0000",
                    "door1",
                ),
                PuzzleElement::door("door1", Rect::new(520.0, 320.0, 20.0, 60.0), "#8B4513"),
            ]
        }

        #[test]
        fn restored_key_is_absent_and_door_open() {
            let restored = RestoredState {
                collected_keys: BTreeSet::from([ElementId::new("key1")]),
                activated_switches: BTreeSet::new(),
                active_checkpoint: Some(Vec2::new(300.0, 340.0)),
            };
            let state = RuntimeLevelState::from_definition(&level_with(elements()), &restored);

            assert!(state.element(&ElementId::new("key1")).is_none());
            assert!(door_open(&state, "door1"));
            assert_eq!(state.spawn_point(), Vec2::new(300.0, 340.0));
        }

        #[test]
        fn restored_switch_is_rearmed() {
            let restored = RestoredState {
                collected_keys: BTreeSet::new(),
                activated_switches: BTreeSet::from([ElementId::new("switch1")]),
                active_checkpoint: None,
            };
            let state = RuntimeLevelState::from_definition(&level_with(elements()), &restored);

            let element = state.element(&ElementId::new("switch1")).unwrap();
            assert!(matches!(
                element.kind,
                ElementKind::Switch { active: true, .. }
            ));
            assert!(door_open(&state, "door1"));
        }

        #[test]
        fn reset_run_clears_triggers_but_keeps_checkpoint() {
            let mut all = elements();
            all.push(PuzzleElement::checkpoint(
                "checkpoint1",
                Rect::new(300.0, 340.0, 20.0, 20.0),
                "#00BCD4",
            ));
            let mut state = fresh(all);

            // Collect the key, trip the switch, touch the checkpoint.
            state.apply_interactions(&Rect::new(55.0, 330.0, 32.0, 32.0));
            state.apply_interactions(&Rect::new(195.0, 330.0, 32.0, 32.0));
            state.apply_interactions(&Rect::new(295.0, 330.0, 32.0, 32.0));
            state.mark_goal_reached();
            assert!(door_open(&state, "door1"));

            state.reset_run();

            assert!(state.collected_keys().is_empty());
            assert!(state.activated_switches().is_empty());
            assert!(!state.goal_reached());
            assert!(!door_open(&state, "door1"));
            // The key is back in the world; the respawn point survives.
            assert!(state.element(&ElementId::new("key1")).is_some());
            assert_eq!(state.checkpoint(), Some(Vec2::new(300.0, 340.0)));
        }
    }
}
