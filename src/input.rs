//! Keyboard input mapping
//!
//! Key events only touch the held-key set and the snake's pending velocity;
//! the next step picks the velocity up. The direction choice itself is the
//! pure `resolve_velocity`, so it can be tested without any event source.

use glam::IVec2;

use crate::sim::{Board, GamePhase, GameState};

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Up,
    Right,
    Down,
    /// Space bar
    Pause,
}

impl Key {
    /// Map a `KeyboardEvent.key` value
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "ArrowLeft" | "Left" | "a" | "A" => Some(Key::Left),
            "ArrowUp" | "Up" | "w" | "W" => Some(Key::Up),
            "ArrowRight" | "Right" | "d" | "D" => Some(Key::Right),
            "ArrowDown" | "Down" | "s" | "S" => Some(Key::Down),
            " " | "Spacebar" => Some(Key::Pause),
            _ => None,
        }
    }

    /// Map a legacy `KeyboardEvent.which` / `keyCode` value
    pub fn from_key_code(code: u32) -> Option<Self> {
        match code {
            37 | 65 => Some(Key::Left),
            38 | 87 => Some(Key::Up),
            39 | 68 => Some(Key::Right),
            40 | 83 => Some(Key::Down),
            32 => Some(Key::Pause),
            _ => None,
        }
    }

    pub fn direction(self) -> Option<Direction> {
        match self {
            Key::Left => Some(Direction::Left),
            Key::Up => Some(Direction::Up),
            Key::Right => Some(Direction::Right),
            Key::Down => Some(Direction::Down),
            Key::Pause => None,
        }
    }
}

/// The four axis directions, in resolution priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
    ];

    /// One step in this direction (screen coordinates, y grows downward)
    pub fn delta(self, grid: i32) -> IVec2 {
        match self {
            Direction::Left => IVec2::new(-grid, 0),
            Direction::Up => IVec2::new(0, -grid),
            Direction::Right => IVec2::new(grid, 0),
            Direction::Down => IVec2::new(0, grid),
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Direction keys currently held down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PressedKeys {
    held: [bool; 4],
}

impl PressedKeys {
    pub fn press(&mut self, direction: Direction) {
        self.held[direction.index()] = true;
    }

    pub fn release(&mut self, direction: Direction) {
        self.held[direction.index()] = false;
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        self.held[direction.index()]
    }

    pub fn is_empty(&self) -> bool {
        !self.held.iter().any(|&h| h)
    }

    pub fn clear(&mut self) {
        self.held = [false; 4];
    }
}

/// Pick the next velocity from the held keys.
///
/// Keys are tried in `Direction::ALL` order. A horizontal key only applies
/// while `heading` has no horizontal component, a vertical key only while it
/// has no vertical one, so the result is never the reverse of `heading`.
/// With `wrap_around` on, a key pointing out of the board from a cell on that
/// edge flips sign. If no held key applies, `current` is kept.
pub fn resolve_velocity(
    heading: IVec2,
    current: IVec2,
    head: IVec2,
    pressed: &PressedKeys,
    wrap_around: bool,
    board: &Board,
) -> IVec2 {
    let g = board.grid;
    for direction in Direction::ALL {
        if !pressed.is_held(direction) {
            continue;
        }
        let velocity = match direction {
            Direction::Left if heading.x == 0 => {
                let flip = wrap_around && head.x <= 0;
                IVec2::new(if flip { g } else { -g }, 0)
            }
            Direction::Up if heading.y == 0 => {
                let flip = wrap_around && head.y <= 0;
                IVec2::new(0, if flip { g } else { -g })
            }
            Direction::Right if heading.x == 0 => {
                let flip = wrap_around && head.x >= board.width - g;
                IVec2::new(if flip { -g } else { g }, 0)
            }
            Direction::Down if heading.y == 0 => {
                let flip = wrap_around && head.y >= board.height - g;
                IVec2::new(0, if flip { -g } else { g })
            }
            _ => continue,
        };
        return velocity;
    }
    current
}

/// What a key event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResponse {
    /// Nothing visible changed
    Ignored,
    /// Pause key flipped the phase
    PauseToggled(GamePhase),
    /// Pending velocity changed
    Steered(IVec2),
}

/// Turns key events into pause toggles and velocity changes
#[derive(Debug, Clone, Default)]
pub struct InputMapper {
    pressed: PressedKeys,
}

impl InputMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pressed(&self) -> &PressedKeys {
        &self.pressed
    }

    /// Handle a key press. Pause is checked before any movement key.
    pub fn key_down(&mut self, key: Key, state: &mut GameState) -> InputResponse {
        let Some(direction) = key.direction() else {
            if state.is_game_over() {
                return InputResponse::Ignored;
            }
            return InputResponse::PauseToggled(state.toggle_pause());
        };
        self.pressed.press(direction);
        self.steer(state)
    }

    /// Handle a key release; the remaining held keys are resolved again
    pub fn key_up(&mut self, key: Key, state: &mut GameState) -> InputResponse {
        match key.direction() {
            Some(direction) => {
                self.pressed.release(direction);
                self.steer(state)
            }
            None => InputResponse::Ignored,
        }
    }

    /// Forget every held key
    pub fn clear(&mut self) {
        self.pressed.clear();
    }

    fn steer(&self, state: &mut GameState) -> InputResponse {
        if !state.is_running() {
            return InputResponse::Ignored;
        }
        let snake = &state.snake;
        let next = resolve_velocity(
            snake.heading,
            snake.velocity,
            snake.head,
            &self.pressed,
            state.wrap_around,
            &state.board,
        );
        if next == snake.velocity {
            return InputResponse::Ignored;
        }
        state.snake.velocity = next;
        InputResponse::Steered(next)
    }
}
