//! Collision detection on the grid
//!
//! Everything is axis-aligned and exact: two cells collide when their pixel
//! coordinates are equal.

use std::collections::VecDeque;

use glam::IVec2;

use super::state::Board;

/// Where a candidate head position lands relative to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryCheck {
    /// On the board, nothing to do
    Inside,
    /// Left the board; the wrapped position is where it re-enters
    Crossed { wrapped: IVec2 },
}

/// Classify a head position against the board edges
pub fn check_boundary(pos: IVec2, board: &Board) -> BoundaryCheck {
    if board.contains(pos) {
        BoundaryCheck::Inside
    } else {
        BoundaryCheck::Crossed {
            wrapped: wrap_position(pos, board),
        }
    }
}

/// Wrap each axis independently into `[0, dim)`
#[inline]
pub fn wrap_position(pos: IVec2, board: &Board) -> IVec2 {
    IVec2::new(pos.x.rem_euclid(board.width), pos.y.rem_euclid(board.height))
}

/// Find the first pair of distinct body indices sharing a cell
///
/// Checks every pair, head included. Returns the lower index first.
pub fn find_self_collision(cells: &VecDeque<IVec2>) -> Option<(usize, usize)> {
    for (i, a) in cells.iter().enumerate() {
        for (j, b) in cells.iter().enumerate().skip(i + 1) {
            if a == b {
                return Some((i, j));
            }
        }
    }
    None
}

/// Whether the head sits on the apple
#[inline]
pub fn head_on_apple(head: IVec2, apple: IVec2) -> bool {
    head == apple
}
