//! Frame throttling and the per-step simulation
//!
//! `frame` is called once per display refresh. Only every
//! `speed_divisor`-th call while running advances the snake by one grid step.

use super::collision::{BoundaryCheck, check_boundary, find_self_collision, head_on_apple};
use super::state::{GamePhase, GameState};

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    /// Left the board with wrap-around off
    Wall,
    /// Two body cells (indices, head = 0) landed on the same grid cell
    SelfCollision { first: usize, second: usize },
}

/// Outcome of one grid step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    Moved,
    AteApple {
        score: u32,
        high_score: u32,
        new_high_score: bool,
    },
    GameOver(DeathCause),
}

/// Outcome of one refresh callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Paused or game over, state untouched
    Idle,
    /// Counted toward the divisor, no step yet
    Throttled,
    Stepped(StepEvent),
}

/// Handle one display refresh
pub fn frame(state: &mut GameState) -> Frame {
    if !state.is_running() {
        return Frame::Idle;
    }

    state.tick_counter += 1;
    if state.tick_counter < state.speed_divisor {
        return Frame::Throttled;
    }
    state.tick_counter = 0;

    match step(state) {
        Some(event) => Frame::Stepped(event),
        None => Frame::Idle,
    }
}

/// Advance the snake by exactly one grid step, ignoring the throttle.
///
/// Returns `None` unless the game is running.
pub fn step(state: &mut GameState) -> Option<StepEvent> {
    if !state.is_running() {
        return None;
    }

    let velocity = state.snake.velocity;
    state.snake.heading = velocity;
    let mut head = state.snake.head + velocity;

    if let BoundaryCheck::Crossed { wrapped } = check_boundary(head, &state.board) {
        if !state.wrap_around {
            return Some(end_run(state, DeathCause::Wall));
        }
        head = wrapped;
    }

    state.snake.advance_to(head);

    if let Some((first, second)) = find_self_collision(&state.snake.cells) {
        return Some(end_run(state, DeathCause::SelfCollision { first, second }));
    }

    if head_on_apple(head, state.apple.pos) {
        state.snake.max_cells += 1;
        state.relocate_apple();
        let new_high_score = state.award_apple();
        log::debug!(
            "Apple eaten at {:?}, score {} (best {}), next apple at {:?}",
            head,
            state.score,
            state.high_score,
            state.apple.pos
        );
        return Some(StepEvent::AteApple {
            score: state.score,
            high_score: state.high_score,
            new_high_score,
        });
    }

    Some(StepEvent::Moved)
}

fn end_run(state: &mut GameState, cause: DeathCause) -> StepEvent {
    state.phase = GamePhase::GameOver;
    log::info!("Game over ({:?}), score {}", cause, state.score);
    StepEvent::GameOver(cause)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use glam::IVec2;
    use proptest::prelude::*;

    use super::*;
    use crate::consts::GRID;
    use crate::input::{InputMapper, Key};

    fn cells(points: &[(i32, i32)]) -> VecDeque<IVec2> {
        points.iter().map(|&(x, y)| IVec2::new(x, y)).collect()
    }

    fn snapshot(state: &GameState) -> String {
        serde_json::to_string(state).unwrap()
    }

    #[test]
    fn test_eating_apple_grows_and_scores() {
        let mut state = GameState::default();
        state.snake.velocity = IVec2::new(GRID, 0);
        state.apple.pos = IVec2::new(176, 160);

        let event = step(&mut state).unwrap();

        assert_eq!(
            event,
            StepEvent::AteApple {
                score: 1,
                high_score: 1,
                new_high_score: true
            }
        );
        assert_eq!(state.snake.head, IVec2::new(176, 160));
        assert_eq!(state.snake.max_cells, 2);
        assert_eq!(state.score, 1);
        assert!(state.board.contains(state.apple.pos));
        assert_eq!(state.apple.pos % GRID, IVec2::ZERO);

        // Body catches up to the new target length on the next step
        step(&mut state);
        assert_eq!(state.snake.len(), 2);
    }

    #[test]
    fn test_wall_ends_run_in_normal_mode() {
        let mut state = GameState::default();
        state.snake.head = IVec2::new(0, 160);
        state.snake.velocity = IVec2::new(-GRID, 0);

        let event = step(&mut state).unwrap();

        assert_eq!(event, StepEvent::GameOver(DeathCause::Wall));
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.snake.head, IVec2::new(0, 160));
        assert_eq!(frame(&mut state), Frame::Idle);
    }

    #[test]
    fn test_wrap_mode_reenters_opposite_edge() {
        let mut state = GameState::default();
        state.wrap_around = true;
        state.snake.head = IVec2::new(0, 160);
        state.snake.velocity = IVec2::new(-GRID, 0);

        assert_eq!(step(&mut state), Some(StepEvent::Moved));
        assert_eq!(state.snake.head, IVec2::new(state.board.width - GRID, 160));
        assert_eq!(state.phase, GamePhase::Running);

        state.snake.head = IVec2::new(160, state.board.height - GRID);
        state.snake.velocity = IVec2::new(0, GRID);
        step(&mut state);
        assert_eq!(state.snake.head, IVec2::new(160, 0));
    }

    #[test]
    fn test_pause_freezes_state() {
        let mut state = GameState::default();
        let mut input = InputMapper::new();
        input.key_down(Key::Right, &mut state);
        step(&mut state);

        input.key_down(Key::Pause, &mut state);
        assert_eq!(state.phase, GamePhase::Paused);
        let frozen = snapshot(&state);
        for _ in 0..30 {
            assert_eq!(frame(&mut state), Frame::Idle);
        }
        assert_eq!(snapshot(&state), frozen);

        input.key_down(Key::Pause, &mut state);
        assert_eq!(state.phase, GamePhase::Running);
        step(&mut state);
        assert_eq!(state.snake.head, IVec2::new(192, 160));
    }

    #[test]
    fn test_frames_throttled_by_divisor() {
        let mut state = GameState::default();
        state.set_speed_divisor(6);
        state.snake.velocity = IVec2::new(GRID, 0);

        for _ in 0..5 {
            assert_eq!(frame(&mut state), Frame::Throttled);
        }
        assert_eq!(state.snake.head, IVec2::new(160, 160));
        assert_eq!(frame(&mut state), Frame::Stepped(StepEvent::Moved));
        assert_eq!(state.snake.head, IVec2::new(176, 160));
        assert_eq!(state.tick_counter, 0);
    }

    #[test]
    fn test_running_into_body_ends_run() {
        let mut state = GameState::default();
        state.snake.cells = cells(&[(32, 16), (16, 16), (16, 0), (32, 0), (48, 0)]);
        state.snake.head = IVec2::new(32, 16);
        state.snake.max_cells = 5;
        state.snake.velocity = IVec2::new(0, -GRID);
        state.snake.heading = IVec2::new(GRID, 0);

        let event = step(&mut state).unwrap();

        assert_eq!(
            event,
            StepEvent::GameOver(DeathCause::SelfCollision {
                first: 0,
                second: 4
            })
        );
        assert!(state.is_game_over());
    }

    #[test]
    fn test_chasing_tail_is_safe() {
        let mut state = GameState::default();
        state.snake.cells = cells(&[(16, 0), (16, 16), (0, 16), (0, 0)]);
        state.snake.head = IVec2::new(16, 0);
        state.snake.max_cells = 4;
        state.snake.velocity = IVec2::new(-GRID, 0);

        assert_eq!(step(&mut state), Some(StepEvent::Moved));
        assert_eq!(state.snake.cells, cells(&[(0, 0), (16, 0), (16, 16), (0, 16)]));
    }

    #[test]
    fn test_step_records_heading() {
        let mut state = GameState::default();
        state.snake.velocity = IVec2::new(0, GRID);
        step(&mut state);
        assert_eq!(state.snake.heading, IVec2::new(0, GRID));
    }

    #[test]
    fn test_high_score_survives_restart() {
        let mut state = GameState::default();
        state.snake.velocity = IVec2::new(GRID, 0);
        state.apple.pos = IVec2::new(176, 160);
        step(&mut state);
        state.restart();
        assert_eq!(state.score, 0);
        assert_eq!(state.high_score, 1);

        state.snake.velocity = IVec2::new(GRID, 0);
        state.apple.pos = IVec2::new(176, 160);
        let event = step(&mut state).unwrap();
        assert_eq!(
            event,
            StepEvent::AteApple {
                score: 1,
                high_score: 1,
                new_high_score: false
            }
        );
    }

    #[test]
    fn test_same_seed_same_apples() {
        let mut a = GameState::default();
        let mut b = GameState::default();
        for _ in 0..10 {
            a.relocate_apple();
            b.relocate_apple();
            assert_eq!(a.apple, b.apple);
        }
    }

    #[derive(Debug, Clone)]
    enum Action {
        Press(Key),
        Release(Key),
        Refresh,
    }

    fn direction_key() -> impl Strategy<Value = Key> {
        prop_oneof![
            Just(Key::Left),
            Just(Key::Up),
            Just(Key::Right),
            Just(Key::Down)
        ]
    }

    fn action() -> impl Strategy<Value = Action> {
        prop_oneof![
            direction_key().prop_map(Action::Press),
            direction_key().prop_map(Action::Release),
            Just(Action::Refresh),
            Just(Action::Refresh),
        ]
    }

    proptest! {
        #[test]
        fn prop_play_keeps_invariants(
            actions in prop::collection::vec(action(), 1..300),
            wrap_around in any::<bool>(),
            seed in any::<u64>(),
        ) {
            let mut state = GameState::new(&crate::Settings::default(), seed);
            state.wrap_around = wrap_around;
            state.set_speed_divisor(1);
            let mut input = InputMapper::new();

            for action in actions {
                let max_cells = state.snake.max_cells;
                let high_score = state.high_score;
                let score = state.score;
                let heading = state.snake.heading;
                let mut restarted = false;

                match action {
                    Action::Press(key) => {
                        input.key_down(key, &mut state);
                    }
                    Action::Release(key) => {
                        input.key_up(key, &mut state);
                    }
                    Action::Refresh => {
                        if let Frame::Stepped(event) = frame(&mut state) {
                            if heading != IVec2::ZERO {
                                prop_assert_ne!(state.snake.heading, -heading);
                            }
                            match event {
                                StepEvent::AteApple { score: s, .. } => {
                                    prop_assert_eq!(s, score + 1);
                                    prop_assert_eq!(state.snake.max_cells, max_cells + 1);
                                }
                                StepEvent::GameOver(_) => {
                                    input.clear();
                                    state.restart();
                                    restarted = true;
                                }
                                StepEvent::Moved => {}
                            }
                        }
                    }
                }

                let v = state.snake.velocity;
                prop_assert!(v.x == 0 || v.y == 0);
                if state.snake.heading != IVec2::ZERO {
                    prop_assert_ne!(v, -state.snake.heading);
                }
                prop_assert!(state.snake.len() <= state.snake.max_cells);
                prop_assert!(state.high_score >= high_score);
                prop_assert!(state.board.contains(state.snake.head));
                prop_assert!(state.board.contains(state.apple.pos));
                if !restarted {
                    prop_assert!(state.snake.max_cells >= max_cells);
                }
            }
        }

        #[test]
        fn prop_duplicate_cell_ends_run(
            body in prop::collection::vec((0..25i32, 0..25i32), 1..20),
            dup_from in any::<prop::sample::Index>(),
            direction in direction_key(),
        ) {
            let mut state = GameState::default();
            state.wrap_around = true;
            let mut body: VecDeque<IVec2> = body
                .into_iter()
                .map(|(c, r)| IVec2::new(c * GRID, r * GRID))
                .collect();
            let dup = body[dup_from.index(body.len())];
            body.push_back(dup);

            state.snake.head = body[0];
            state.snake.max_cells = body.len() + 1;
            state.snake.cells = body;
            state.snake.velocity = direction.direction().map(|d| d.delta(GRID)).unwrap_or_default();

            let event = step(&mut state);
            let ended_by_self_collision = matches!(
                event,
                Some(StepEvent::GameOver(DeathCause::SelfCollision { .. }))
            );
            prop_assert!(ended_by_self_collision);
            prop_assert!(state.is_game_over());
        }
    }
}
