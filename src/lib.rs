//! Gate Cat core crate.
//!
//! Two-lane rhythm game: the left lane keeps the gate stable, the right lane
//! (open only while the gate holds) walks the cat to the door. The beat
//! timing & judging engine in [`engine`] is plain Rust and runs natively under
//! `cargo test`; [`web`] hosts it in the browser with a canvas renderer.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod engine;
pub mod error;
pub mod levels;
pub mod web;

pub use config::{Judging, Tuning};
pub use engine::beat::{Beat, BeatState, Lane, Outcome, Timing};
pub use engine::state::{GameResult, GameState, LossReason, Phase};
pub use engine::{Engine, EngineEvent, Snapshot};
pub use error::ConfigError;
pub use levels::{LanePattern, LevelConfig};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}
