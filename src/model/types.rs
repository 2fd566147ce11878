//! Core type definitions for the application

use std::time::{Duration, Instant};

use super::quiz::{QuizSession, Round, RoundState, SelectionOutcome};

/// How long the title screen stays up
pub const SPLASH_DURATION: Duration = Duration::from_secs(2);

/// Which screen is currently shown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Splash,
    ArtistSearch,
    Game,
}

/// UI state for the application
#[derive(Clone)]
pub struct UiState {
    pub screen: Screen,
    pub splash_started: Instant,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub show_help_popup: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            screen: Screen::Splash,
            splash_started: Instant::now(),
            error_message: None,
            error_timestamp: None,
            show_help_popup: false,
        }
    }
}

/// Quiz progress as seen by the game screen
#[derive(Clone, Debug, Default)]
pub struct GameState {
    pub session: Option<QuizSession>,
    /// Round built once per index and kept while it is on screen
    pub round: Option<RoundState>,
    pub choice_selected: usize,
    /// Set while the "Correct!"/"Wrong!" popup is waiting to be dismissed
    pub last_outcome: Option<SelectionOutcome>,
}

impl GameState {
    pub fn score(&self) -> u32 {
        self.session.as_ref().map(QuizSession::score).unwrap_or(0)
    }

    pub fn active_round(&self) -> Option<&Round> {
        match &self.round {
            Some(RoundState::Active(round)) => Some(round),
            _ => None,
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self.round, Some(RoundState::Terminal))
    }

    /// "Song 3 of 10" style progress, 1-based
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.session
            .as_ref()
            .filter(|session| !session.is_terminal())
            .map(|session| (session.current_index() + 1, session.len()))
    }
}
