//! Game state and core simulation types
//!
//! One owned `GameState` holds everything the loop, the input mapper and the
//! renderer need. Nothing in here is persisted between sessions.

use std::collections::VecDeque;

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::settings::Settings;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Snake advances on every unthrottled frame
    Running,
    /// Frozen until the pause toggle fires again
    Paused,
    /// Run ended, only a restart leaves this phase
    GameOver,
}

/// Playing field geometry, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub width: i32,
    pub height: i32,
    /// Cell size and step length
    pub grid: i32,
}

impl Board {
    pub const fn new(width: i32, height: i32, grid: i32) -> Self {
        Self {
            width,
            height,
            grid,
        }
    }

    pub fn columns(&self) -> i32 {
        self.width / self.grid
    }

    pub fn rows(&self) -> i32 {
        self.height / self.grid
    }

    /// Whether a pixel position lies on the board
    #[inline]
    pub fn contains(&self, pos: IVec2) -> bool {
        (0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y)
    }

    /// Pick a grid-aligned cell, column and row drawn independently
    pub fn random_cell<R: Rng>(&self, rng: &mut R) -> IVec2 {
        let col = rng.random_range(0..self.columns().max(1));
        let row = rng.random_range(0..self.rows().max(1));
        IVec2::new(col * self.grid, row * self.grid)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BOARD_WIDTH, BOARD_HEIGHT, GRID)
    }
}

/// The snake
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snake {
    /// Head position in pixels
    pub head: IVec2,
    /// Body cells, head first
    pub cells: VecDeque<IVec2>,
    /// Target body length, grows by one per apple
    pub max_cells: usize,
    /// Velocity for the next step; one axis at most, magnitude = grid unit
    pub velocity: IVec2,
    /// Velocity used by the last completed step
    pub heading: IVec2,
}

impl Snake {
    pub fn new(head: IVec2) -> Self {
        Self {
            head,
            cells: VecDeque::with_capacity(16),
            max_cells: START_MAX_CELLS,
            velocity: IVec2::ZERO,
            heading: IVec2::ZERO,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Move the head and push it onto the body, dropping tail cells beyond `max_cells`
    pub fn advance_to(&mut self, head: IVec2) {
        self.head = head;
        self.cells.push_front(head);
        self.cells.truncate(self.max_cells);
    }
}

/// The apple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Apple {
    pub pos: IVec2,
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub board: Board,
    /// Spawn point used on restart
    pub start: IVec2,
    pub snake: Snake,
    pub apple: Apple,
    /// Apples eaten this run (equals the body length when the last one was eaten)
    pub score: u32,
    /// Best score this session, survives restarts
    pub high_score: u32,
    pub phase: GamePhase,
    /// Special switch: crossing an edge re-enters from the opposite side
    pub wrap_around: bool,
    /// Refresh callbacks since the last step
    pub tick_counter: u32,
    /// Refresh callbacks per step
    pub speed_divisor: u32,
    rng: Pcg32,
}

impl GameState {
    pub fn new(settings: &Settings, seed: u64) -> Self {
        let board = settings.board();
        let start = IVec2::new(settings.start_x, settings.start_y);
        let mut rng = Pcg32::seed_from_u64(seed);

        let first_apple = IVec2::new(FIRST_APPLE_X, FIRST_APPLE_Y);
        let apple = if board.contains(first_apple) && first_apple % board.grid == IVec2::ZERO {
            first_apple
        } else {
            board.random_cell(&mut rng)
        };

        Self {
            seed,
            board,
            start,
            snake: Snake::new(start),
            apple: Apple { pos: apple },
            score: 0,
            high_score: 0,
            phase: GamePhase::Running,
            wrap_around: settings.wrap_around,
            tick_counter: 0,
            speed_divisor: settings.speed.divisor(),
            rng,
        }
    }

    /// Start a new run. High score, speed, wrap mode and board carry over.
    pub fn restart(&mut self) {
        self.snake = Snake::new(self.start);
        self.relocate_apple();
        self.score = 0;
        self.tick_counter = 0;
        self.phase = GamePhase::Running;
    }

    /// Flip between Running and Paused; GameOver is left alone
    pub fn toggle_pause(&mut self) -> GamePhase {
        self.phase = match self.phase {
            GamePhase::Running => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Running,
            GamePhase::GameOver => GamePhase::GameOver,
        };
        self.phase
    }

    pub fn toggle_wrap_around(&mut self) -> bool {
        self.wrap_around = !self.wrap_around;
        self.wrap_around
    }

    pub fn set_speed_divisor(&mut self, divisor: u32) {
        self.speed_divisor = divisor.max(1);
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Move the apple to a random cell. Cells under the snake are not excluded.
    pub fn relocate_apple(&mut self) {
        self.apple.pos = self.board.random_cell(&mut self.rng);
    }

    /// Record an eaten apple, returns true when the high score moved
    pub fn award_apple(&mut self) -> bool {
        self.score += 1;
        if self.score > self.high_score {
            self.high_score = self.score;
            true
        } else {
            false
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(&Settings::default(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SpeedPreset;

    #[test]
    fn test_new_state_matches_defaults() {
        let state = GameState::new(&Settings::default(), 7);
        assert_eq!(state.snake.head, IVec2::new(START_X, START_Y));
        assert!(state.snake.is_empty());
        assert_eq!(state.snake.max_cells, 1);
        assert_eq!(state.snake.velocity, IVec2::ZERO);
        assert_eq!(state.apple.pos, IVec2::new(FIRST_APPLE_X, FIRST_APPLE_Y));
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.speed_divisor, DEFAULT_SPEED_DIVISOR);
    }

    #[test]
    fn test_first_apple_falls_back_on_small_board() {
        let settings = Settings {
            board_width: 160,
            board_height: 160,
            start_x: 0,
            start_y: 0,
            ..Settings::default()
        };
        let state = GameState::new(&settings, 3);
        assert!(state.board.contains(state.apple.pos));
    }

    #[test]
    fn test_snake_advance_truncates_tail() {
        let mut snake = Snake::new(IVec2::new(0, 0));
        snake.max_cells = 2;
        snake.advance_to(IVec2::new(16, 0));
        snake.advance_to(IVec2::new(32, 0));
        snake.advance_to(IVec2::new(48, 0));
        assert_eq!(snake.len(), 2);
        assert_eq!(snake.cells[0], IVec2::new(48, 0));
        assert_eq!(snake.cells[1], IVec2::new(32, 0));
        assert_eq!(snake.head, IVec2::new(48, 0));
    }

    #[test]
    fn test_random_cell_is_aligned_and_inside() {
        let board = Board::default();
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..500 {
            let cell = board.random_cell(&mut rng);
            assert!(board.contains(cell));
            assert_eq!(cell.x % board.grid, 0);
            assert_eq!(cell.y % board.grid, 0);
        }
    }

    #[test]
    fn test_restart_keeps_high_score_and_modes() {
        let settings = Settings {
            speed: SpeedPreset::Fast,
            ..Settings::default()
        };
        let mut state = GameState::new(&settings, 11);
        state.award_apple();
        state.award_apple();
        state.snake.max_cells = 3;
        state.snake.velocity = IVec2::new(GRID, 0);
        state.toggle_wrap_around();
        state.phase = GamePhase::GameOver;

        state.restart();

        assert_eq!(state.score, 0);
        assert_eq!(state.high_score, 2);
        assert_eq!(state.snake.max_cells, 1);
        assert_eq!(state.snake.velocity, IVec2::ZERO);
        assert_eq!(state.snake.head, state.start);
        assert!(state.wrap_around);
        assert_eq!(state.speed_divisor, SpeedPreset::Fast.divisor());
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.board.contains(state.apple.pos));
    }

    #[test]
    fn test_toggle_pause_ignores_game_over() {
        let mut state = GameState::default();
        assert_eq!(state.toggle_pause(), GamePhase::Paused);
        assert_eq!(state.toggle_pause(), GamePhase::Running);
        state.phase = GamePhase::GameOver;
        assert_eq!(state.toggle_pause(), GamePhase::GameOver);
    }

    #[test]
    fn test_award_apple_tracks_high_score() {
        let mut state = GameState::default();
        state.high_score = 2;
        assert!(!state.award_apple());
        assert!(!state.award_apple());
        assert!(state.award_apple());
        assert_eq!(state.score, 3);
        assert_eq!(state.high_score, 3);
    }

    #[test]
    fn test_speed_divisor_never_zero() {
        let mut state = GameState::default();
        state.set_speed_divisor(0);
        assert_eq!(state.speed_divisor, 1);
    }

    #[test]
    fn test_state_serializes_to_json() {
        let state = GameState::default();
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.snake.head, state.snake.head);
        assert_eq!(back.apple, state.apple);
    }
}
