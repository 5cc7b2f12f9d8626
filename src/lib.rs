//! Venn Sort - a Venn diagram classification puzzle
//!
//! Core modules:
//! - `sim`: Pure game core (zone classification, board positions, session phases)
//! - `api`: Client for the remote scoring service
//! - `game`: Async driver tying the core to the service, sounds and leaderboard
//! - `input`: Pointer events to board mutations
//! - `audio`: Injectable sound service
//! - `settings`: Configuration and preferences

pub mod api;
pub mod audio;
pub mod error;
pub mod game;
pub mod input;
pub mod leaderboard;
pub mod settings;
pub mod sim;

pub use error::{GameError, Result};
pub use game::Game;
pub use leaderboard::Leaderboard;
pub use settings::Settings;

use glam::Vec2;

/// Board layout constants (pixels)
pub mod consts {
    use glam::Vec2;

    /// Item box dimensions; the classification point is the box center
    pub const ITEM_WIDTH: f32 = 120.0;
    pub const ITEM_HEIGHT: f32 = 40.0;
    pub const ITEM_CENTER_OFFSET: Vec2 = Vec2::new(ITEM_WIDTH / 2.0, ITEM_HEIGHT / 2.0);

    /// Starting grid for freshly loaded items
    pub const GRID_ORIGIN: Vec2 = Vec2::new(20.0, 30.0);
    pub const GRID_COLUMN_WIDTH: f32 = 140.0;
    pub const GRID_ROW_SPACING: f32 = 60.0;
    pub const ITEMS_PER_COLUMN: usize = 3;

    /// Circle defaults on every level reset (diameter 200, centers)
    pub const DEFAULT_CIRCLE_SIZE: f32 = 200.0;
    pub const DEFAULT_CENTER_A: Vec2 = Vec2::new(200.0, 220.0);
    pub const DEFAULT_CENTER_B: Vec2 = Vec2::new(380.0, 220.0);
}

/// Classification point of an item anchored at `anchor` (top-left)
#[inline]
pub fn item_center(anchor: Vec2) -> Vec2 {
    anchor + consts::ITEM_CENTER_OFFSET
}

/// Default top-left anchor of the `index`-th item of a level
#[inline]
pub fn grid_position(index: usize) -> Vec2 {
    let col = (index / consts::ITEMS_PER_COLUMN) as f32;
    let row = (index % consts::ITEMS_PER_COLUMN) as f32;
    consts::GRID_ORIGIN + Vec2::new(col * consts::GRID_COLUMN_WIDTH, row * consts::GRID_ROW_SPACING)
}

/// Browser entry point: route `log` to the console and panics to `console.error`
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Venn Sort core loaded");
}
