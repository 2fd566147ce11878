//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by screen:
//!
//! - `utils`: Shared utility functions (truncation, scrollable lists, centering)
//! - `splash`: Title screen
//! - `search`: Artist search screen
//! - `game`: Quiz screen
//! - `overlays`: Modal overlays (error, round result, help)

mod utils;
mod splash;
mod search;
mod game;
mod overlays;

use ratatui::Frame;

use crate::model::{GameState, Screen, SearchState, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, ui_state: &UiState, search_state: &SearchState, game_state: &GameState) {
        let area = frame.area();

        match ui_state.screen {
            Screen::Splash => splash::render_splash(frame, area),
            Screen::ArtistSearch => search::render_search_screen(frame, area, search_state),
            Screen::Game => {
                game::render_game_screen(frame, area, game_state);
                overlays::render_round_result(frame, game_state);
            }
        }

        // Error notification overlay (if there's an error)
        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }

        // Help popup overlay (if open)
        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    use crate::model::{ArtistSuggestion, QuizSession, Track};

    fn track(id: &str, title: &str) -> Track {
        Track {
            id: id.to_string(),
            title: title.to_string(),
            album_title: "Abbey Road".to_string(),
            album_art_url: String::new(),
            preview_url: String::new(),
        }
    }

    fn render_to_string(ui_state: &UiState, search_state: &SearchState, game_state: &GameState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| AppView::render(frame, ui_state, search_state, game_state))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn ui_on(screen: Screen) -> UiState {
        UiState {
            screen,
            ..Default::default()
        }
    }

    #[test]
    fn splash_shows_title() {
        let text = render_to_string(&UiState::default(), &SearchState::default(), &GameState::default());
        assert!(text.contains("Music Nerd"));
    }

    #[test]
    fn search_screen_lists_suggestions_and_start_button() {
        let artist = ArtistSuggestion {
            id: "1".to_string(),
            name: "The Beatles".to_string(),
        };
        let mut search_state = SearchState::default();
        search_state.artist_name = "beat".to_string();
        search_state.suggestions = vec![artist.clone()];
        let text = render_to_string(&ui_on(Screen::ArtistSearch), &search_state, &GameState::default());
        assert!(text.contains("beat"));
        assert!(text.contains("The Beatles"));

        let mut ready = SearchState::default();
        ready.artist_name = "The Beatles".to_string();
        ready.selected_artist = Some(artist);
        ready.tracks = vec![track("a", "Something")];
        let text = render_to_string(&ui_on(Screen::ArtistSearch), &ready, &GameState::default());
        assert!(text.contains("Let's go!"));
    }

    #[test]
    fn game_screen_shows_score_progress_and_choices() {
        let session = QuizSession::start(vec![
            track("a", "Come Together"),
            track("b", "Something"),
            track("c", "Octopus's Garden"),
        ])
        .unwrap();
        let round = session.current_round(&mut rand::thread_rng());
        let game_state = GameState {
            session: Some(session),
            round: Some(round),
            ..Default::default()
        };

        let text = render_to_string(&ui_on(Screen::Game), &SearchState::default(), &game_state);
        assert!(text.contains("Score: 0"));
        assert!(text.contains("Song 1 of 3"));
        assert!(text.contains("Come Together"));
        assert!(text.contains("Something"));
        assert!(text.contains("Octopus's Garden"));
    }

    #[test]
    fn error_overlay_is_drawn_on_top() {
        let ui_state = UiState {
            screen: Screen::ArtistSearch,
            error_message: Some("Rate limited".to_string()),
            ..Default::default()
        };
        let text = render_to_string(&ui_state, &SearchState::default(), &GameState::default());
        assert!(text.contains("Rate limited"));
        assert!(text.contains("Error (Esc to dismiss)"));
    }
}
