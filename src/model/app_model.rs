//! Main application model with state management

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use super::types::{GameState, Screen, UiState, SPLASH_DURATION};
use super::search::{DebounceDecision, SearchState};
use super::quiz::{QuizError, QuizSession, RoundState, SelectionOutcome};
use super::track::{ArtistSuggestion, Track};
use super::catalog_client::CatalogClient;

/// Main application model containing all state
pub struct AppModel {
    pub catalog: Option<CatalogClient>,
    pub ui_state: Arc<Mutex<UiState>>,
    pub search_state: Arc<Mutex<SearchState>>,
    pub game_state: Arc<Mutex<GameState>>,
    pub should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            catalog: None,
            ui_state: Arc::new(Mutex::new(UiState::default())),
            search_state: Arc::new(Mutex::new(SearchState::default())),
            game_state: Arc::new(Mutex::new(GameState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub fn set_catalog_client(&mut self, client: CatalogClient) {
        self.catalog = Some(client);
    }

    pub async fn get_catalog_client(&self) -> Option<CatalogClient> {
        self.catalog.clone()
    }

    // ========================================================================
    // Screens & overlays
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn screen(&self) -> Screen {
        self.ui_state.lock().await.screen
    }

    pub async fn set_screen(&self, screen: Screen) {
        self.ui_state.lock().await.screen = screen;
    }

    pub async fn finish_splash_if_elapsed(&self) {
        let mut state = self.ui_state.lock().await;
        if state.screen == Screen::Splash && state.splash_started.elapsed() >= SPLASH_DURATION {
            state.screen = Screen::ArtistSearch;
        }
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed().as_secs() > 5 {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }

    pub async fn show_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = true;
    }

    pub async fn hide_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }

    // ========================================================================
    // Artist search
    // ========================================================================

    pub async fn get_search_state(&self) -> SearchState {
        self.search_state.lock().await.clone()
    }

    pub async fn append_to_search(&self, c: char) -> u64 {
        self.search_state.lock().await.push_char(c)
    }

    pub async fn backspace_search(&self) -> u64 {
        self.search_state.lock().await.backspace()
    }

    pub async fn clear_search(&self) -> u64 {
        self.search_state.lock().await.clear_input()
    }

    pub async fn settle_search(&self, generation: u64) -> DebounceDecision {
        self.search_state.lock().await.settle(generation)
    }

    pub async fn set_suggestions(&self, generation: u64, suggestions: Vec<ArtistSuggestion>) -> bool {
        self.search_state.lock().await.apply_suggestions(generation, suggestions)
    }

    pub async fn has_suggestions(&self) -> bool {
        !self.search_state.lock().await.suggestions.is_empty()
    }

    pub async fn suggestion_move_up(&self) {
        self.search_state.lock().await.move_up();
    }

    pub async fn suggestion_move_down(&self) {
        self.search_state.lock().await.move_down();
    }

    pub async fn select_suggestion(&self) -> Option<ArtistSuggestion> {
        self.search_state.lock().await.select_suggestion()
    }

    pub async fn set_artist_tracks(&self, artist_id: &str, tracks: Vec<Track>) -> bool {
        self.search_state.lock().await.apply_tracks(artist_id, tracks)
    }

    pub async fn artist_tracks_failed(&self, artist_id: &str) {
        self.search_state.lock().await.tracks_failed(artist_id);
    }

    pub async fn can_start_game(&self) -> bool {
        self.search_state.lock().await.can_start_game()
    }

    // ========================================================================
    // Quiz
    // ========================================================================

    pub async fn get_game_state(&self) -> GameState {
        self.game_state.lock().await.clone()
    }

    /// Start a session over the fetched tracks and return the first target.
    pub async fn start_game(&self) -> Result<Option<Track>, QuizError> {
        let tracks = self.search_state.lock().await.tracks.clone();
        let session = QuizSession::start(tracks)?;

        let mut game = self.game_state.lock().await;
        *game = GameState {
            session: Some(session),
            ..Default::default()
        };
        Self::build_round(&mut game);
        drop(game);

        self.set_screen(Screen::Game).await;
        Ok(self.current_target().await)
    }

    fn build_round(game: &mut GameState) {
        let round = game
            .session
            .as_ref()
            .map(|session| session.current_round(&mut rand::thread_rng()));
        game.round = round;
        game.choice_selected = 0;
    }

    pub async fn current_target(&self) -> Option<Track> {
        self.game_state
            .lock()
            .await
            .active_round()
            .map(|round| round.target.clone())
    }

    pub async fn has_pending_result(&self) -> bool {
        self.game_state.lock().await.last_outcome.is_some()
    }

    pub async fn choice_move_left(&self) {
        let mut game = self.game_state.lock().await;
        if game.choice_selected > 0 {
            game.choice_selected -= 1;
        }
    }

    pub async fn choice_move_right(&self) {
        let mut game = self.game_state.lock().await;
        let count = game.active_round().map(|round| round.choices.len()).unwrap_or(0);
        if game.choice_selected < count.saturating_sub(1) {
            game.choice_selected += 1;
        }
    }

    /// Answer with the choice at `index`, or the highlighted one when `None`.
    ///
    /// Returns `Ok(None)` when there is nothing to answer on screen, e.g. an
    /// out-of-range index or a result popup that is still open.
    pub async fn choose(&self, index: Option<usize>) -> Result<Option<SelectionOutcome>, QuizError> {
        let mut game = self.game_state.lock().await;
        if game.last_outcome.is_some() {
            return Ok(None);
        }

        let index = index.unwrap_or(game.choice_selected);
        let chosen_id = match game.active_round().and_then(|round| round.choices.get(index)) {
            Some(track) => track.id.clone(),
            None => return Ok(None),
        };

        let session = game.session.as_mut().ok_or(QuizError::NoActiveRound)?;
        let outcome = session.resolve_selection(&chosen_id)?;
        game.choice_selected = index;
        game.last_outcome = Some(outcome);
        Ok(Some(outcome))
    }

    /// Dismiss the result popup and move to the next round, returning its target.
    pub async fn acknowledge_result(&self) -> Option<Track> {
        let mut game = self.game_state.lock().await;
        game.last_outcome.take()?;
        Self::build_round(&mut game);
        game.active_round().map(|round| round.target.clone())
    }

    /// Restart the finished session with the same tracks.
    pub async fn play_again(&self) -> Option<Track> {
        let mut game = self.game_state.lock().await;
        game.session.as_mut()?.reset();
        game.last_outcome = None;
        Self::build_round(&mut game);
        game.active_round().map(|round| round.target.clone())
    }

    pub async fn is_game_over(&self) -> bool {
        matches!(self.game_state.lock().await.round, Some(RoundState::Terminal))
    }

    /// Abandon the session and go back to the search screen.
    pub async fn leave_game(&self) {
        *self.game_state.lock().await = GameState::default();
        self.set_screen(Screen::ArtistSearch).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Song {id}"),
            album_title: "Album".to_string(),
            album_art_url: String::new(),
            preview_url: format!("https://p.scdn.co/mp3-preview/{id}"),
        }
    }

    async fn model_with_tracks(ids: &[&str]) -> AppModel {
        let model = AppModel::new();
        let generation = model.append_to_search('x').await;
        model.settle_search(generation).await;
        let artist = ArtistSuggestion {
            id: "artist".to_string(),
            name: "X".to_string(),
        };
        model.set_suggestions(generation, vec![artist]).await;
        model.select_suggestion().await.unwrap();
        model
            .set_artist_tracks("artist", ids.iter().map(|id| track(id)).collect())
            .await;
        model
    }

    async fn target_index(model: &AppModel) -> usize {
        let game = model.get_game_state().await;
        let round = game.active_round().unwrap();
        round
            .choices
            .iter()
            .position(|t| t.id == round.target.id)
            .unwrap()
    }

    #[tokio::test]
    async fn starting_without_tracks_fails() {
        let model = AppModel::new();
        assert_eq!(model.start_game().await.unwrap_err(), QuizError::EmptyTrackList);
        assert_eq!(model.screen().await, Screen::Splash);
    }

    #[tokio::test]
    async fn start_game_switches_screen_and_returns_first_target() {
        let model = model_with_tracks(&["a", "b", "c"]).await;
        assert!(model.can_start_game().await);

        let first = model.start_game().await.unwrap().unwrap();
        assert_eq!(first.id, "a");
        assert_eq!(model.screen().await, Screen::Game);
        assert_eq!(model.get_game_state().await.score(), 0);
    }

    #[tokio::test]
    async fn round_stays_fixed_until_answered() {
        let model = model_with_tracks(&["a", "b", "c", "d", "e"]).await;
        model.start_game().await.unwrap();

        let before = model.get_game_state().await.round;
        model.choice_move_right().await;
        let after = model.get_game_state().await.round;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn full_game_with_popup_and_replay() {
        let model = model_with_tracks(&["a", "b"]).await;
        model.start_game().await.unwrap();

        let index = target_index(&model).await;
        let outcome = model.choose(Some(index)).await.unwrap().unwrap();
        assert_eq!(outcome, SelectionOutcome { correct: true, new_score: 10 });

        // Popup open: further answers are ignored
        assert_eq!(model.choose(Some(0)).await.unwrap(), None);
        assert!(model.has_pending_result().await);

        let next = model.acknowledge_result().await.unwrap();
        assert_eq!(next.id, "b");

        let wrong = (target_index(&model).await + 1) % 2;
        let outcome = model.choose(Some(wrong)).await.unwrap().unwrap();
        assert_eq!(outcome, SelectionOutcome { correct: false, new_score: 10 });

        assert!(model.acknowledge_result().await.is_none());
        assert!(model.is_game_over().await);
        assert_eq!(model.get_game_state().await.score(), 10);

        let first = model.play_again().await.unwrap();
        assert_eq!(first.id, "a");
        assert_eq!(model.get_game_state().await.score(), 0);
    }

    #[tokio::test]
    async fn out_of_range_choice_is_ignored() {
        let model = model_with_tracks(&["a"]).await;
        model.start_game().await.unwrap();

        assert_eq!(model.choose(Some(2)).await.unwrap(), None);
        assert_eq!(model.get_game_state().await.session.unwrap().current_index(), 0);
    }

    #[tokio::test]
    async fn leaving_the_game_drops_the_session() {
        let model = model_with_tracks(&["a"]).await;
        model.start_game().await.unwrap();

        model.leave_game().await;
        assert_eq!(model.screen().await, Screen::ArtistSearch);
        assert!(model.get_game_state().await.session.is_none());
        assert!(model.can_start_game().await);
    }
}
