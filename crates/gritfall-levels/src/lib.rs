//! # Gritfall Levels
//!
//! The static level catalog for Gritfall: the level-data collaborator the
//! simulation core consumes as opaque read-only input.
//!
//! Levels are built from [`gritfall_core::level`] types and follow the
//! tutorial arc of the campaign: basic movement, then one puzzle mechanic at
//! a time (switch, key, moving platform, pressure plate), then combinations
//! with hazards and checkpoints.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use glam::Vec2;

use gritfall_core::geometry::Rect;
use gritfall_core::level::{
    Difficulty, LevelDefinition, MovePattern, PuzzleElement, StaticPlatform,
};

const PLATFORM_BROWN: &str = "#8B4513";
const GOAL_GREEN: &str = "#4CAF50";
const SWITCH_RED: &str = "#FF0000";
const KEY_GOLD: &str = "#FFD700";
const DOOR_BROWN: &str = "#8B4513";
const PLATFORM_PURPLE: &str = "#9C27B0";
const PLATE_BROWN: &str = "#795548";
const SPIKE_PINK: &str = "#E91E63";
const CHECKPOINT_CYAN: &str = "#00BCD4";

/// The full catalog, in campaign order.
#[must_use]
pub fn levels() -> Vec<LevelDefinition> {
    vec![
        first_steps(),
        red_button(),
        golden_key(),
        moving_bridge(),
        heavy_steps(),
        double_switch(),
        spike_danger(),
        key_chain(),
        moving_maze(),
        checkpoint_challenge(),
    ]
}

/// Looks up a level by id.
#[must_use]
pub fn find(id: u32) -> Option<LevelDefinition> {
    levels().into_iter().find(|level| level.id == id)
}

fn platform(x: f32, y: f32, width: f32, height: f32) -> StaticPlatform {
    StaticPlatform::new(Rect::new(x, y, width, height), PLATFORM_BROWN)
}

fn goal(x: f32, y: f32, width: f32, height: f32) -> StaticPlatform {
    StaticPlatform::goal(Rect::new(x, y, width, height), GOAL_GREEN)
}

fn first_steps() -> LevelDefinition {
    LevelDefinition {
        id: 1,
        name: "First Steps".into(),
        description: "Learn to jump and move. Reach the green goal platform.".into(),
        difficulty: Difficulty::Easy,
        time_limit_secs: None,
        player_start: Vec2::new(50.0, 350.0),
        platforms: vec![
            platform(0.0, 380.0, 150.0, 20.0),
            platform(200.0, 340.0, 100.0, 20.0),
            goal(350.0, 300.0, 150.0, 20.0),
        ],
        elements: vec![],
    }
}

fn red_button() -> LevelDefinition {
    LevelDefinition {
        id: 2,
        name: "Red Button".into(),
        description: "Step on the red switch to open the door.".into(),
        difficulty: Difficulty::Easy,
        time_limit_secs: None,
        player_start: Vec2::new(50.0, 350.0),
        platforms: vec![
            platform(0.0, 380.0, 150.0, 20.0),
            platform(200.0, 380.0, 100.0, 20.0),
            platform(350.0, 380.0, 150.0, 20.0),
            goal(600.0, 340.0, 150.0, 20.0),
        ],
        elements: vec![
            PuzzleElement::switch(
                "switch1",
                Rect::new(240.0, 360.0, 20.0, 20.0),
                SWITCH_RED,
                "door1",
            ),
            PuzzleElement::door("door1", Rect::new(520.0, 320.0, 20.0, 60.0), DOOR_BROWN),
        ],
    }
}

fn golden_key() -> LevelDefinition {
    LevelDefinition {
        id: 3,
        name: "Golden Key".into(),
        description: "Collect the key to unlock the door.".into(),
        difficulty: Difficulty::Easy,
        time_limit_secs: None,
        player_start: Vec2::new(50.0, 350.0),
        platforms: vec![
            platform(0.0, 380.0, 150.0, 20.0),
            platform(200.0, 300.0, 100.0, 20.0),
            platform(350.0, 380.0, 150.0, 20.0),
            goal(600.0, 340.0, 150.0, 20.0),
        ],
        elements: vec![
            PuzzleElement::key(
                "key1",
                Rect::new(230.0, 280.0, 15.0, 15.0),
                KEY_GOLD,
                "door1",
            ),
            PuzzleElement::door("door1", Rect::new(520.0, 320.0, 20.0, 60.0), DOOR_BROWN),
        ],
    }
}

fn moving_bridge() -> LevelDefinition {
    LevelDefinition {
        id: 4,
        name: "Moving Bridge".into(),
        description: "Time your jump onto the moving platform.".into(),
        difficulty: Difficulty::Easy,
        time_limit_secs: None,
        player_start: Vec2::new(50.0, 350.0),
        platforms: vec![platform(0.0, 380.0, 150.0, 20.0), goal(500.0, 340.0, 150.0, 20.0)],
        elements: vec![PuzzleElement::moving_platform(
            "moving1",
            Rect::new(200.0, 360.0, 80.0, 15.0),
            PLATFORM_PURPLE,
            MovePattern {
                start: Vec2::new(200.0, 360.0),
                end: Vec2::new(350.0, 360.0),
                speed: 2.0,
            },
        )],
    }
}

fn heavy_steps() -> LevelDefinition {
    LevelDefinition {
        id: 5,
        name: "Heavy Steps".into(),
        description: "Stand on the pressure plate to open the door.".into(),
        difficulty: Difficulty::Easy,
        time_limit_secs: None,
        player_start: Vec2::new(50.0, 350.0),
        platforms: vec![
            platform(0.0, 380.0, 150.0, 20.0),
            platform(200.0, 380.0, 100.0, 20.0),
            platform(350.0, 300.0, 100.0, 20.0),
            platform(500.0, 380.0, 150.0, 20.0),
            goal(700.0, 340.0, 150.0, 20.0),
        ],
        elements: vec![
            PuzzleElement::pressure_plate(
                "plate1",
                Rect::new(380.0, 280.0, 30.0, 15.0),
                PLATE_BROWN,
                "door1",
            ),
            PuzzleElement::door("door1", Rect::new(670.0, 320.0, 20.0, 60.0), DOOR_BROWN),
        ],
    }
}

fn double_switch() -> LevelDefinition {
    LevelDefinition {
        id: 6,
        name: "Double Switch".into(),
        description: "Either switch opens the path.".into(),
        difficulty: Difficulty::Easy,
        time_limit_secs: None,
        player_start: Vec2::new(50.0, 350.0),
        platforms: vec![
            platform(0.0, 380.0, 150.0, 20.0),
            platform(200.0, 320.0, 80.0, 20.0),
            platform(320.0, 380.0, 80.0, 20.0),
            platform(450.0, 320.0, 80.0, 20.0),
            goal(600.0, 340.0, 150.0, 20.0),
        ],
        elements: vec![
            PuzzleElement::switch(
                "switch1",
                Rect::new(230.0, 300.0, 20.0, 20.0),
                SWITCH_RED,
                "door1",
            ),
            PuzzleElement::switch(
                "switch2",
                Rect::new(480.0, 300.0, 20.0, 20.0),
                SWITCH_RED,
                "door1",
            ),
            PuzzleElement::door("door1", Rect::new(570.0, 320.0, 20.0, 60.0), DOOR_BROWN),
        ],
    }
}

fn spike_danger() -> LevelDefinition {
    LevelDefinition {
        id: 7,
        name: "Spike Danger".into(),
        description: "Avoid the deadly spikes!".into(),
        difficulty: Difficulty::Easy,
        time_limit_secs: None,
        player_start: Vec2::new(50.0, 350.0),
        platforms: vec![
            platform(0.0, 380.0, 100.0, 20.0),
            platform(200.0, 380.0, 100.0, 20.0),
            platform(400.0, 380.0, 100.0, 20.0),
            goal(600.0, 340.0, 150.0, 20.0),
        ],
        elements: vec![
            PuzzleElement::spike("spike1", Rect::new(120.0, 360.0, 60.0, 20.0), SPIKE_PINK),
            PuzzleElement::spike("spike2", Rect::new(320.0, 360.0, 60.0, 20.0), SPIKE_PINK),
        ],
    }
}

fn key_chain() -> LevelDefinition {
    LevelDefinition {
        id: 8,
        name: "Key Chain".into(),
        description: "Collect both keys in the right order.".into(),
        difficulty: Difficulty::Medium,
        time_limit_secs: None,
        player_start: Vec2::new(50.0, 350.0),
        platforms: vec![
            platform(0.0, 380.0, 150.0, 20.0),
            platform(200.0, 300.0, 80.0, 20.0),
            platform(320.0, 250.0, 80.0, 20.0),
            platform(450.0, 300.0, 80.0, 20.0),
            platform(600.0, 380.0, 150.0, 20.0),
            goal(800.0, 340.0, 150.0, 20.0),
        ],
        elements: vec![
            PuzzleElement::key(
                "key1",
                Rect::new(230.0, 280.0, 15.0, 15.0),
                KEY_GOLD,
                "door1",
            ),
            PuzzleElement::door("door1", Rect::new(410.0, 280.0, 20.0, 60.0), DOOR_BROWN),
            PuzzleElement::key(
                "key2",
                Rect::new(480.0, 280.0, 15.0, 15.0),
                KEY_GOLD,
                "door2",
            ),
            PuzzleElement::door("door2", Rect::new(770.0, 320.0, 20.0, 60.0), DOOR_BROWN),
        ],
    }
}

fn moving_maze() -> LevelDefinition {
    LevelDefinition {
        id: 9,
        name: "Moving Maze".into(),
        description: "Navigate across the moving platforms.".into(),
        difficulty: Difficulty::Medium,
        time_limit_secs: None,
        player_start: Vec2::new(50.0, 350.0),
        platforms: vec![platform(0.0, 380.0, 100.0, 20.0), goal(600.0, 340.0, 150.0, 20.0)],
        elements: vec![
            PuzzleElement::moving_platform(
                "moving1",
                Rect::new(150.0, 360.0, 60.0, 15.0),
                PLATFORM_PURPLE,
                MovePattern {
                    start: Vec2::new(150.0, 360.0),
                    end: Vec2::new(250.0, 360.0),
                    speed: 2.0,
                },
            ),
            PuzzleElement::moving_platform(
                "moving2",
                Rect::new(300.0, 320.0, 60.0, 15.0),
                PLATFORM_PURPLE,
                MovePattern {
                    start: Vec2::new(300.0, 320.0),
                    end: Vec2::new(400.0, 280.0),
                    speed: 1.5,
                },
            ),
            PuzzleElement::moving_platform(
                "moving3",
                Rect::new(450.0, 350.0, 60.0, 15.0),
                PLATFORM_PURPLE,
                MovePattern {
                    start: Vec2::new(450.0, 350.0),
                    end: Vec2::new(520.0, 350.0),
                    speed: 3.0,
                },
            ),
        ],
    }
}

fn checkpoint_challenge() -> LevelDefinition {
    LevelDefinition {
        id: 10,
        name: "Checkpoint Challenge".into(),
        description: "Use the checkpoints to save your progress.".into(),
        difficulty: Difficulty::Medium,
        time_limit_secs: None,
        player_start: Vec2::new(50.0, 350.0),
        platforms: vec![
            platform(0.0, 380.0, 150.0, 20.0),
            platform(200.0, 320.0, 80.0, 20.0),
            platform(350.0, 380.0, 80.0, 20.0),
            platform(500.0, 280.0, 80.0, 20.0),
            platform(650.0, 380.0, 80.0, 20.0),
            platform(800.0, 200.0, 80.0, 20.0),
            goal(950.0, 340.0, 150.0, 20.0),
        ],
        elements: vec![
            PuzzleElement::checkpoint(
                "checkpoint1",
                Rect::new(380.0, 360.0, 20.0, 20.0),
                CHECKPOINT_CYAN,
            ),
            PuzzleElement::spike("spike1", Rect::new(460.0, 360.0, 120.0, 20.0), SPIKE_PINK),
            PuzzleElement::checkpoint(
                "checkpoint2",
                Rect::new(680.0, 360.0, 20.0, 20.0),
                CHECKPOINT_CYAN,
            ),
            PuzzleElement::spike("spike2", Rect::new(760.0, 360.0, 120.0, 20.0), SPIKE_PINK),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gritfall_core::events::{GameEvent, RecordingSink};
    use gritfall_core::level::ElementId;
    use gritfall_core::puzzle::RestoredState;
    use gritfall_core::SimulationEngine;

    #[test]
    fn catalog_ids_are_unique_and_ordered() {
        let catalog = levels();
        let ids: Vec<u32> = catalog.iter().map(|l| l.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn every_level_validates() {
        for level in levels() {
            assert_eq!(level.validate(), Ok(()), "level {} is invalid", level.id);
        }
    }

    #[test]
    fn every_level_has_a_goal() {
        for level in levels() {
            assert!(
                level.goal_platform().is_some(),
                "level {} has no goal platform",
                level.id
            );
        }
    }

    #[test]
    fn find_looks_up_by_id() {
        assert_eq!(find(3).map(|l| l.name), Some("Golden Key".to_string()));
        assert!(find(99).is_none());
    }

    #[test]
    fn catalog_serializes_for_external_tools() {
        let json = serde_json::to_string(&levels()).unwrap();
        let back: Vec<gritfall_core::level::LevelDefinition> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(back, levels());
    }

    #[test]
    fn moving_platforms_start_at_their_pattern_origin() {
        for level in levels() {
            for element in &level.elements {
                if let gritfall_core::level::ElementKind::MovingPlatform { pattern, .. } =
                    &element.kind
                {
                    assert_eq!(
                        element.rect.pos, pattern.start,
                        "element {} in level {} starts off-pattern",
                        element.id, level.id
                    );
                }
            }
        }
    }

    #[test]
    fn red_button_switch_opens_its_door_in_the_engine() {
        let sink = RecordingSink::new();
        let mut engine = SimulationEngine::new(
            glam::Vec2::new(800.0, 600.0),
            levels(),
            Box::new(sink.clone()),
        );
        // Resume from a checkpoint just left of the switch at x=240.
        let restored = RestoredState {
            active_checkpoint: Some(Vec2::new(230.0, 340.0)),
            ..RestoredState::default()
        };
        engine.load_level(2, restored);

        // Settle onto the platform; the drop lands on the switch.
        for frame in 0..10 {
            engine.update(f64::from(frame) * 16.67);
        }

        let events = sink.take_events();
        assert!(events.contains(&GameEvent::SwitchActivated(ElementId::new("switch1"))));

        let state = engine.run_state().unwrap();
        assert!(matches!(
            state.element(&ElementId::new("door1")).unwrap().kind,
            gritfall_core::level::ElementKind::Door { open: true }
        ));
    }
}
