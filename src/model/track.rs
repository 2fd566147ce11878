//! Catalog data types shared by the quiz and the UI

use rspotify::model::{FullArtist, FullTrack};
use rspotify::prelude::Id;

use super::quiz::MAX_TRACKS;

/// A playable song entry, immutable once fetched
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub album_title: String,
    /// Empty when the album has no artwork
    pub album_art_url: String,
    /// Empty when the catalog offers no preview
    pub preview_url: String,
}

impl Track {
    /// Convert a catalog track. Local files have no id and are skipped.
    pub fn from_full_track(track: FullTrack) -> Option<Self> {
        let id = track.id.as_ref().map(|id| id.id().to_string())?;

        Some(Self {
            id,
            title: track.name,
            album_title: track.album.name,
            album_art_url: track
                .album
                .images
                .into_iter()
                .next()
                .map(|image| image.url)
                .unwrap_or_default(),
            preview_url: track.preview_url.unwrap_or_default(),
        })
    }

    /// Playable tracks in catalog order, capped at one session's worth.
    pub fn from_catalog(tracks: Vec<FullTrack>) -> Vec<Self> {
        tracks
            .into_iter()
            .filter_map(Self::from_full_track)
            .take(MAX_TRACKS)
            .collect()
    }

    pub fn has_preview(&self) -> bool {
        !self.preview_url.is_empty()
    }
}

/// An artist from search results
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtistSuggestion {
    pub id: String,
    pub name: String,
}

impl From<FullArtist> for ArtistSuggestion {
    fn from(artist: FullArtist) -> Self {
        Self {
            id: artist.id.id().to_string(),
            name: artist.name,
        }
    }
}
