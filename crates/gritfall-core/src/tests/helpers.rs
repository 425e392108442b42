//! Test setup utilities: level factories and engine construction.

use glam::Vec2;

use crate::engine::SimulationEngine;
use crate::events::RecordingSink;
use crate::geometry::Rect;
use crate::level::{Difficulty, LevelDefinition, MovePattern, PuzzleElement, StaticPlatform};

/// Viewport used by every scenario.
pub const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

/// Initializes test logging once; safe to call from every test.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A bare level skeleton: a wide floor at `y = 380` and a goal platform off
/// to the right, actor starting on the floor.
pub fn level_skeleton(id: u32, elements: Vec<PuzzleElement>) -> LevelDefinition {
    LevelDefinition {
        id,
        name: format!("Scenario {id}"),
        description: String::new(),
        difficulty: Difficulty::Easy,
        time_limit_secs: None,
        player_start: Vec2::new(100.0, 348.0),
        platforms: vec![
            StaticPlatform::new(Rect::new(0.0, 380.0, 600.0, 20.0), "#8B4513"),
            StaticPlatform::goal(Rect::new(700.0, 340.0, 150.0, 20.0), "#4CAF50"),
        ],
        elements,
    }
}

/// A level whose only solid obstacle on the walk right is a closed door at
/// `x = 300`, opened by `switch1` (placed beyond the door, out of the test's
/// walking path).
pub fn door_level(id: u32) -> LevelDefinition {
    level_skeleton(
        id,
        vec![
            PuzzleElement::switch(
                "switch1",
                Rect::new(400.0, 360.0, 20.0, 20.0),
                "#FF0000",
                "door1",
            ),
            PuzzleElement::door("door1", Rect::new(300.0, 320.0, 20.0, 60.0), "#8B4513"),
        ],
    )
}

/// A level with a single horizontally oscillating platform over a pit; the
/// actor starts standing on the platform at its `t = 0` position.
pub fn moving_platform_level(id: u32) -> LevelDefinition {
    LevelDefinition {
        id,
        name: format!("Scenario {id}"),
        description: String::new(),
        difficulty: Difficulty::Easy,
        time_limit_secs: None,
        player_start: Vec2::new(220.0, 328.0),
        platforms: vec![StaticPlatform::goal(
            Rect::new(700.0, 340.0, 150.0, 20.0),
            "#4CAF50",
        )],
        elements: vec![PuzzleElement::moving_platform(
            "moving1",
            Rect::new(200.0, 360.0, 80.0, 15.0),
            "#9C27B0",
            MovePattern {
                start: Vec2::new(200.0, 360.0),
                end: Vec2::new(350.0, 360.0),
                speed: 2.0,
            },
        )],
    }
}

/// Builds an engine over `levels` plus a handle onto its recorded events.
pub fn engine_with(levels: Vec<LevelDefinition>) -> (SimulationEngine, RecordingSink) {
    let sink = RecordingSink::new();
    let engine = SimulationEngine::new(VIEWPORT, levels, Box::new(sink.clone()));
    (engine, sink)
}

/// Drives `frames` updates at the 60 Hz baseline cadence, starting from
/// timestamp zero.
pub fn drive(engine: &mut SimulationEngine, frames: u32) {
    for frame in 0..frames {
        engine.update(f64::from(frame) * 16.67);
    }
}

/// Continues driving `frames` more updates after `drive` ran `offset` frames.
pub fn drive_from(engine: &mut SimulationEngine, offset: u32, frames: u32) {
    for frame in offset..offset + frames {
        engine.update(f64::from(frame) * 16.67);
    }
}
