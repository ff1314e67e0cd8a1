//! Game settings
//!
//! Board geometry, spawn point and speed. Nothing here is persisted: the page
//! may hand over a JSON object through the canvas `data-settings` attribute,
//! everything else falls back to the defaults.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::Board;

/// Speed presets offered by the speed buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeedPreset {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl SpeedPreset {
    pub const ALL: [SpeedPreset; 3] = [SpeedPreset::Slow, SpeedPreset::Normal, SpeedPreset::Fast];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedPreset::Slow => "Slow",
            SpeedPreset::Normal => "Normal",
            SpeedPreset::Fast => "Fast",
        }
    }

    /// Parse a preset name, or a divisor matching one of the presets
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "slow" => return Some(SpeedPreset::Slow),
            "normal" | "medium" | "med" => return Some(SpeedPreset::Normal),
            "fast" => return Some(SpeedPreset::Fast),
            _ => {}
        }
        let divisor = s.parse::<f64>().ok()?;
        Self::ALL
            .into_iter()
            .find(|preset| f64::from(preset.divisor()) == divisor)
    }

    /// Refresh callbacks per simulation step (larger = slower snake)
    pub fn divisor(&self) -> u32 {
        match self {
            SpeedPreset::Slow => 10,
            SpeedPreset::Normal => DEFAULT_SPEED_DIVISOR,
            SpeedPreset::Fast => 3,
        }
    }
}

/// Rejected settings
#[derive(Debug)]
pub enum SettingsError {
    /// Not valid JSON, or fields of the wrong type
    Parse(serde_json::Error),
    /// Grid unit must be positive
    ZeroGrid,
    /// Board dimensions must be positive multiples of the grid unit
    BoardNotAligned { width: i32, height: i32, grid: i32 },
    /// Spawn point must be a grid-aligned cell on the board
    StartOutOfBoard { x: i32, y: i32 },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Parse(e) => write!(f, "invalid settings JSON: {e}"),
            SettingsError::ZeroGrid => write!(f, "grid unit must be positive"),
            SettingsError::BoardNotAligned {
                width,
                height,
                grid,
            } => write!(
                f,
                "board {width}x{height} is not a positive multiple of grid {grid}"
            ),
            SettingsError::StartOutOfBoard { x, y } => {
                write!(f, "start ({x}, {y}) is not a grid cell on the board")
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Parse(e)
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Board width in pixels
    pub board_width: i32,
    /// Board height in pixels
    pub board_height: i32,
    /// Cell size in pixels
    pub grid: i32,
    /// Snake spawn point (pixels)
    pub start_x: i32,
    pub start_y: i32,
    /// Initial speed
    pub speed: SpeedPreset,
    /// Start with the special (wrap-around) switch on
    pub wrap_around: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            board_width: BOARD_WIDTH,
            board_height: BOARD_HEIGHT,
            grid: GRID,
            start_x: START_X,
            start_y: START_Y,
            speed: SpeedPreset::Normal,
            wrap_around: false,
        }
    }
}

impl Settings {
    /// Default settings on a board of the given pixel size
    pub fn with_board_size(width: i32, height: i32) -> Self {
        Self {
            board_width: width,
            board_height: height,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON settings object; missing fields use defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.grid <= 0 {
            return Err(SettingsError::ZeroGrid);
        }
        let aligned = |dim: i32| dim > 0 && dim % self.grid == 0;
        if !aligned(self.board_width) || !aligned(self.board_height) {
            return Err(SettingsError::BoardNotAligned {
                width: self.board_width,
                height: self.board_height,
                grid: self.grid,
            });
        }
        let on_board = |v: i32, dim: i32| (0..dim).contains(&v) && v % self.grid == 0;
        if !on_board(self.start_x, self.board_width) || !on_board(self.start_y, self.board_height)
        {
            return Err(SettingsError::StartOutOfBoard {
                x: self.start_x,
                y: self.start_y,
            });
        }
        Ok(())
    }

    pub fn board(&self) -> Board {
        Board::new(self.board_width, self.board_height, self.grid)
    }
}
