//! Artist search: debounced suggestions and top-track loading

use crate::model::{ArtistSuggestion, DebounceDecision, SEARCH_DEBOUNCE};
use super::AppController;

impl AppController {
    /// Arm the debounce timer for the edit that produced `generation`.
    pub(crate) fn schedule_suggestions(&self, generation: u64) {
        let controller = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(SEARCH_DEBOUNCE).await;
            controller.settle_suggestions(generation).await;
        });
    }

    pub async fn settle_suggestions(&self, generation: u64) {
        let model = self.model.lock().await;

        let query = match model.settle_search(generation).await {
            DebounceDecision::Lookup(query) => query,
            decision => {
                tracing::trace!(generation, decision = ?decision, "No lookup needed");
                return;
            }
        };

        let Some(catalog) = model.get_catalog_client().await else {
            return;
        };
        drop(model);

        tracing::debug!(query, generation, "Looking up artist suggestions");

        match catalog.search_artists(&query).await {
            Ok(suggestions) => {
                let count = suggestions.len();
                let model = self.model.lock().await;
                if model.set_suggestions(generation, suggestions).await {
                    tracing::info!(query, count, "Artist suggestions updated");
                } else {
                    tracing::debug!(query, "Discarding suggestions for outdated input");
                }
            }
            Err(e) => {
                tracing::error!(query, error = %e, "Artist search failed");
                let model = self.model.lock().await;
                model.set_error(Self::format_error(&e)).await;
            }
        }
    }

    /// Fetch the chosen artist's top tracks in the background.
    pub(crate) fn spawn_load_artist_tracks(&self, artist: ArtistSuggestion) {
        let controller = self.clone();
        tokio::spawn(async move {
            controller.load_artist_tracks(&artist).await;
        });
    }

    pub async fn load_artist_tracks(&self, artist: &ArtistSuggestion) {
        tracing::info!(artist = %artist.name, artist_id = %artist.id, "Loading top tracks");

        let model = self.model.lock().await;
        let Some(catalog) = model.get_catalog_client().await else {
            return;
        };
        drop(model);

        match catalog.fetch_top_tracks(&artist.id).await {
            Ok(tracks) if tracks.is_empty() => {
                tracing::warn!(artist = %artist.name, "Artist has no top tracks");
                let model = self.model.lock().await;
                model.artist_tracks_failed(&artist.id).await;
                model
                    .set_error(format!("No tracks found for {}.", artist.name))
                    .await;
            }
            Ok(tracks) => {
                let count = tracks.len();
                let model = self.model.lock().await;
                if model.set_artist_tracks(&artist.id, tracks).await {
                    tracing::info!(artist = %artist.name, count, "Tracks ready for quiz");
                } else {
                    tracing::debug!(artist = %artist.name, "Discarding tracks for replaced artist");
                }
            }
            Err(e) => {
                tracing::error!(artist_id = %artist.id, error = %e, "Failed to fetch top tracks");
                let model = self.model.lock().await;
                model.artist_tracks_failed(&artist.id).await;
                model.set_error(Self::format_error(&e)).await;
            }
        }
    }
}
