//! Kick Target core crate.
//!
//! A point-and-click passing game: the player stands in the middle of a ring of
//! positions, one of which hides a teammate. Clicking the right spot kicks the ball
//! over with a confetti burst and a "NICE HIT!" prompt; wrong spots shake.
//!
//! Game logic (`geometry`, `state`, `anim`, `input`, `render`, `game`) is plain Rust
//! and is tested on the host. `web` wires it to a canvas in the browser.

use wasm_bindgen::prelude::*;

pub mod anim;
pub mod config;
pub mod game;
pub mod geometry;
pub mod input;
pub mod render;
pub mod state;
pub mod surface;
mod web;

pub use config::{ConfigError, GameConfig};
pub use game::{AssetStatus, FrameEvent, FrameHandler, Game};
pub use geometry::Point;
pub use input::Action;
pub use web::CanvasSurface;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(target_arch = "wasm32")]
    console_log::init_with_level(log::Level::Info).ok();
}

// -----------------------------------------------------------------------------
// Unified entrypoints
// -----------------------------------------------------------------------------

/// Wire up the page with default settings.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    web::start(GameConfig::default())
}

/// Same as `start_game`, overriding any subset of `GameConfig` with JSON.
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<(), JsValue> {
    let config = GameConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    web::start(config)
}
