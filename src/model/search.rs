//! Artist search state: debounced suggestions and the chosen artist's tracks
//!
//! Every edit of the input bumps a generation counter. A lookup scheduled for
//! an older generation is dropped when it settles, and results are applied
//! only if no edit happened while the request was in flight.

use std::time::Duration;

use super::track::{ArtistSuggestion, Track};

/// Quiet period after the last keystroke before a lookup is sent
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
pub const SUGGESTION_LIMIT: u32 = 5;

/// What a settled debounce timer should do
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DebounceDecision {
    /// The input changed again after this timer was armed
    Stale,
    /// Same text as the previous lookup
    Duplicate,
    /// Input is empty, suggestions were cleared
    Clear,
    Lookup(String),
}

#[derive(Clone, Debug, Default)]
pub struct SearchState {
    pub artist_name: String,
    pub suggestions: Vec<ArtistSuggestion>,
    pub suggestion_selected: usize,
    pub selected_artist: Option<ArtistSuggestion>,
    pub tracks: Vec<Track>,
    pub is_loading: bool,
    generation: u64,
    last_query: Option<String>,
}

impl SearchState {
    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn push_char(&mut self, c: char) -> u64 {
        self.artist_name.push(c);
        self.touch()
    }

    pub fn backspace(&mut self) -> u64 {
        self.artist_name.pop();
        self.touch()
    }

    pub fn clear_input(&mut self) -> u64 {
        self.artist_name.clear();
        self.touch()
    }

    fn touch(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Decide what to do once the debounce period for `generation` is over.
    pub fn settle(&mut self, generation: u64) -> DebounceDecision {
        if generation != self.generation {
            return DebounceDecision::Stale;
        }

        let query = self.artist_name.trim().to_string();
        if self.last_query.as_deref() == Some(query.as_str()) {
            return DebounceDecision::Duplicate;
        }
        self.last_query = Some(query.clone());

        if query.is_empty() {
            self.suggestions.clear();
            self.suggestion_selected = 0;
            return DebounceDecision::Clear;
        }

        DebounceDecision::Lookup(query)
    }

    /// Store lookup results unless the input moved on meanwhile.
    pub fn apply_suggestions(&mut self, generation: u64, suggestions: Vec<ArtistSuggestion>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.suggestions = suggestions;
        self.suggestion_selected = 0;
        true
    }

    pub fn move_up(&mut self) {
        if self.suggestion_selected > 0 {
            self.suggestion_selected -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.suggestion_selected < self.suggestions.len().saturating_sub(1) {
            self.suggestion_selected += 1;
        }
    }

    /// Pick the highlighted suggestion and prepare for its track fetch.
    pub fn select_suggestion(&mut self) -> Option<ArtistSuggestion> {
        let artist = self.suggestions.get(self.suggestion_selected).cloned()?;

        // Filling the input with the artist name must not fire another lookup
        self.artist_name = artist.name.clone();
        self.last_query = Some(artist.name.clone());
        self.touch();

        self.suggestions.clear();
        self.suggestion_selected = 0;
        self.selected_artist = Some(artist.clone());
        self.tracks.clear();
        self.is_loading = true;
        Some(artist)
    }

    /// Store fetched tracks if `artist_id` is still the chosen artist.
    pub fn apply_tracks(&mut self, artist_id: &str, tracks: Vec<Track>) -> bool {
        if !self.is_selected(artist_id) {
            return false;
        }
        self.tracks = tracks;
        self.is_loading = false;
        true
    }

    pub fn tracks_failed(&mut self, artist_id: &str) {
        if self.is_selected(artist_id) {
            self.tracks.clear();
            self.is_loading = false;
        }
    }

    fn is_selected(&self, artist_id: &str) -> bool {
        self.selected_artist.as_ref().is_some_and(|a| a.id == artist_id)
    }

    pub fn can_start_game(&self) -> bool {
        self.selected_artist.is_some() && !self.tracks.is_empty()
    }
}
