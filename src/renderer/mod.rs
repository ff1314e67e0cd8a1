//! Rendering module
//!
//! `draw` projects a `GameState` onto anything implementing `DrawSurface`.
//! `QuadBatch` collects those rectangles as triangles and `RenderState`
//! presents a batch with WebGPU.

pub mod batch;
pub mod pipeline;
pub mod vertex;

pub use batch::{QuadBatch, board_to_ndc};
pub use pipeline::RenderState;
pub use vertex::{Color, Vertex, colors};

use glam::IVec2;

use crate::sim::GameState;

/// The only drawing operations the game needs
pub trait DrawSurface {
    /// Wipe a `width` x `height` pixel area
    fn clear(&mut self, width: i32, height: i32);

    /// Fill an axis-aligned rectangle with its top-left corner at `pos`
    fn fill_rect(&mut self, pos: IVec2, size: IVec2, color: Color);
}

/// Paint the board: apple first, then every body cell on top.
///
/// Cells are drawn one pixel smaller than the grid so neighbours stay apart.
pub fn draw<S: DrawSurface + ?Sized>(state: &GameState, surface: &mut S) {
    let board = &state.board;
    surface.clear(board.width, board.height);

    let cell = IVec2::splat(board.grid - 1);
    surface.fill_rect(state.apple.pos, cell, colors::APPLE);
    for &pos in &state.snake.cells {
        surface.fill_rect(pos, cell, colors::SNAKE);
    }
}
