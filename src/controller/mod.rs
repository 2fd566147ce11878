//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and drives catalog lookups and
//! snippet playback. It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling per screen
//! - `search`: Debounced artist suggestions and top-track loading
//! - `game`: Quiz flow and snippet playback

mod input;
mod search;
mod game;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::audio::AudioBackend;
use crate::model::AppModel;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) audio_backend: Arc<Mutex<Option<AudioBackend>>>,
}

impl AppController {
    pub fn new(model: Arc<Mutex<AppModel>>, audio_backend: Arc<Mutex<Option<AudioBackend>>>) -> Self {
        Self {
            model,
            audio_backend,
        }
    }

    pub(crate) fn format_error(error: &anyhow::Error) -> String {
        let error_str = error.to_string();

        if error_str.contains("401") {
            "Catalog authentication expired. Please restart the app.".to_string()
        } else if error_str.contains("429") {
            "Rate limited. Please wait a moment.".to_string()
        } else if error_str.contains("404") {
            "Not found in the catalog.".to_string()
        } else if error_str.contains("No preview available") {
            "No preview available for this song.".to_string()
        } else if error_str.contains("No audio output device") {
            "No audio output device found. Snippets are disabled.".to_string()
        } else {
            format!("Error: {}", error_str)
        }
    }
}
