//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `track`: Catalog data (tracks, artist suggestions)
//! - `quiz`: Quiz session state machine and round generation
//! - `search`: Debounced artist search state
//! - `types`: Screen and UI state definitions
//! - `catalog_client`: Spotify catalog API client
//! - `app_model`: Main application model with state management methods

mod track;
mod quiz;
mod search;
mod types;
mod catalog_client;
mod app_model;

pub use track::{ArtistSuggestion, Track};

pub use quiz::{QuizError, QuizSession, Round, RoundState, SelectionOutcome};

pub use search::{DebounceDecision, SearchState, SEARCH_DEBOUNCE};

pub use types::{GameState, Screen, UiState};

pub use catalog_client::CatalogClient;

pub use app_model::AppModel;
