//! Cross-module scenario tests.
//!
//! Per-module behavior is covered by the `#[cfg(test)]` modules inside each
//! source file; this tree exercises the engine end-to-end:
//!
//! - `scenarios.rs`: full frame-pipeline runs — resting, falling, doors,
//!   pickups, checkpoints, moving platforms, determinism
//! - `helpers.rs`: level factories and engine setup utilities

mod helpers;

pub use helpers::*;
