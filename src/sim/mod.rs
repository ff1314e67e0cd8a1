//! Simulation module
//!
//! All gameplay logic lives here. This module must stay host-agnostic:
//! - One owned `GameState`, no globals
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{BoundaryCheck, check_boundary, find_self_collision, head_on_apple, wrap_position};
pub use state::{Apple, Board, GamePhase, GameState, Snake};
pub use tick::{DeathCause, Frame, StepEvent, frame, step};
