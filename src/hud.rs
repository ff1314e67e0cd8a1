//! Page-facing text and visibility state
//!
//! The browser glue asks `Hud::update` once per frame and only touches the
//! DOM for the entries that come back `Some`.

use crate::sim::{GamePhase, GameState};

pub fn score_text(score: u32) -> String {
    format!("Score: {score}")
}

pub fn high_score_text(high_score: u32) -> String {
    format!("High Score: {high_score}")
}

/// Pause button label for a phase
pub fn pause_label(phase: GamePhase) -> &'static str {
    if phase == GamePhase::Paused {
        "Resume"
    } else {
        "Pause"
    }
}

/// Everything the page shows about the game, outside the canvas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudText {
    pub score: String,
    pub high_score: String,
    pub pause_label: &'static str,
    pub game_over: bool,
    pub wrap_around: bool,
}

impl HudText {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            score: score_text(state.score),
            high_score: high_score_text(state.high_score),
            pause_label: pause_label(state.phase),
            game_over: state.is_game_over(),
            wrap_around: state.wrap_around,
        }
    }
}

/// Entries that differ from what the page currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HudChanges {
    pub score: Option<String>,
    pub high_score: Option<String>,
    pub pause_label: Option<&'static str>,
    pub game_over: Option<bool>,
    pub wrap_around: Option<bool>,
}

impl HudChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Remembers what was last pushed to the page
#[derive(Debug, Clone, Default)]
pub struct Hud {
    shown: Option<HudText>,
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff the state against the page; the first call reports everything
    pub fn update(&mut self, state: &GameState) -> HudChanges {
        let next = HudText::from_state(state);
        let changes = match &self.shown {
            None => HudChanges {
                score: Some(next.score.clone()),
                high_score: Some(next.high_score.clone()),
                pause_label: Some(next.pause_label),
                game_over: Some(next.game_over),
                wrap_around: Some(next.wrap_around),
            },
            Some(prev) => HudChanges {
                score: (prev.score != next.score).then(|| next.score.clone()),
                high_score: (prev.high_score != next.high_score).then(|| next.high_score.clone()),
                pause_label: (prev.pause_label != next.pause_label).then_some(next.pause_label),
                game_over: (prev.game_over != next.game_over).then_some(next.game_over),
                wrap_around: (prev.wrap_around != next.wrap_around).then_some(next.wrap_around),
            },
        };
        self.shown = Some(next);
        changes
    }
}
