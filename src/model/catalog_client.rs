//! Spotify catalog client: client-credentials auth, artist search and top tracks

use std::sync::Arc;
use anyhow::{anyhow, Result};
use tokio::sync::RwLock;
use rspotify::{
    model::{ArtistId, Country, Market, SearchResult, SearchType},
    prelude::*,
    ClientCredsSpotify, Config, Credentials,
};

use crate::auth::TokenState;
use crate::{log_api_request, log_api_result};
use super::search::SUGGESTION_LIMIT;
use super::track::{ArtistSuggestion, Track};

const TOP_TRACKS_MARKET: Market = Market::Country(Country::UnitedStates);

/// Catalog API client that owns its access token and refresh policy
#[derive(Clone)]
pub struct CatalogClient {
    client: Arc<ClientCredsSpotify>,
    token: Arc<RwLock<TokenState>>,
}

impl CatalogClient {
    pub fn new(credentials: Credentials) -> Self {
        // Refreshing is driven by `refresh_token_if_needed`, not by rspotify
        let client = ClientCredsSpotify::with_config(
            credentials,
            Config {
                token_cached: false,
                token_refreshing: false,
                ..Default::default()
            },
        );

        Self {
            client: Arc::new(client),
            token: Arc::new(RwLock::new(TokenState::default())),
        }
    }

    /// Exchange the client credentials for a bearer token.
    pub async fn authenticate(&self) -> Result<()> {
        log_api_request!("request_token", grant_type = "client_credentials");
        let result = self.client.request_token().await;
        log_api_result!("request_token", result);
        result?;

        let expires_at = {
            let token = self
                .client
                .token
                .lock()
                .await
                .map_err(|_| anyhow!("Failed to lock rspotify token"))?;
            token.as_ref().and_then(|t| t.expires_at)
        };

        let mut holder = self.token.write().await;
        *holder = TokenState::new(expires_at);
        tracing::debug!(expires_at = ?holder.expires_at(), "Access token stored");
        Ok(())
    }

    pub async fn token_needs_refresh(&self) -> bool {
        self.token.read().await.needs_refresh()
    }

    pub async fn refresh_token_if_needed(&self) -> Result<bool> {
        if !self.token_needs_refresh().await {
            return Ok(false);
        }

        tracing::info!("Token expiring soon, refreshing...");

        match self.authenticate().await {
            Ok(()) => {
                tracing::info!("Token refreshed successfully");
                Ok(true)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to refresh token");
                Err(e)
            }
        }
    }

    pub async fn search_artists(&self, name_fragment: &str) -> Result<Vec<ArtistSuggestion>> {
        log_api_request!("search_artists", query = name_fragment);
        let result = self
            .client
            .search(name_fragment, SearchType::Artist, None, None, Some(SUGGESTION_LIMIT), None)
            .await;
        log_api_result!("search_artists", result);

        match result? {
            SearchResult::Artists(page) => Ok(page
                .items
                .into_iter()
                .map(ArtistSuggestion::from)
                .collect()),
            _ => Err(anyhow!("Artist search returned a different result type")),
        }
    }

    /// Top tracks in the catalog's ranking order, capped at the session size.
    pub async fn fetch_top_tracks(&self, artist_id: &str) -> Result<Vec<Track>> {
        let id = ArtistId::from_id(artist_id)?;

        log_api_request!("fetch_top_tracks", artist_id);
        let result = self.client.artist_top_tracks(id, Some(TOP_TRACKS_MARKET)).await;
        log_api_result!("fetch_top_tracks", result);

        let tracks = Track::from_catalog(result?);

        tracing::info!(artist_id, count = tracks.len(), "Top tracks fetched");
        Ok(tracks)
    }
}
