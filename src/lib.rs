//! Grid Snake - classic snake on a fixed pixel grid
//!
//! Core modules:
//! - `sim`: Simulation (frame throttling, movement, collisions, game state)
//! - `input`: Keyboard mapping to snake velocity
//! - `renderer`: Drawing surface abstraction and WebGPU presentation
//! - `hud`: Score text for the page
//! - `settings`: Board geometry and speed presets

pub mod hud;
pub mod input;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use hud::{Hud, HudText};
pub use input::{InputMapper, Key, PressedKeys, resolve_velocity};
pub use settings::{Settings, SettingsError, SpeedPreset};

/// Game configuration constants
pub mod consts {
    /// Pixel size of one grid cell and of one movement step
    pub const GRID: i32 = 16;

    /// Default board dimensions (25 x 25 cells)
    pub const BOARD_WIDTH: i32 = 400;
    pub const BOARD_HEIGHT: i32 = 400;

    /// Snake spawn point
    pub const START_X: i32 = 160;
    pub const START_Y: i32 = 160;

    /// Where the first apple sits before any has been eaten
    pub const FIRST_APPLE_X: i32 = 320;
    pub const FIRST_APPLE_Y: i32 = 320;

    /// Initial target body length
    pub const START_MAX_CELLS: usize = 1;

    /// Refresh callbacks per step unless a speed button says otherwise
    pub const DEFAULT_SPEED_DIVISOR: u32 = 6;
}
