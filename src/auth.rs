use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rspotify::Credentials;

const CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT_ID";
const CLIENT_SECRET_VAR: &str = "SPOTIFY_CLIENT_SECRET";
/// Refresh once less than this many seconds of validity remain
const REFRESH_MARGIN_SECS: i64 = 300;

/// Read the client id/secret pair from the environment, or from `.env` if present.
pub fn load_credentials() -> Result<Credentials> {
    match dotenv::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) => tracing::debug!(error = %e, "No .env file loaded"),
    }

    let client_id = std::env::var(CLIENT_ID_VAR)
        .with_context(|| format!("{CLIENT_ID_VAR} is not set"))?;
    let client_secret = std::env::var(CLIENT_SECRET_VAR)
        .with_context(|| format!("{CLIENT_SECRET_VAR} is not set"))?;

    tracing::info!("Loaded Spotify client credentials");
    Ok(Credentials::new(&client_id, &client_secret))
}

/// Expiry bookkeeping for the client-credentials access token
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TokenState {
    expires_at: Option<DateTime<Utc>>,
}

impl TokenState {
    pub fn new(expires_at: Option<DateTime<Utc>>) -> Self {
        Self { expires_at }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh_at(Utc::now())
    }

    /// An unknown expiry never asks for a refresh.
    pub fn needs_refresh_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => (expires_at - now).num_seconds() < REFRESH_MARGIN_SECS,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn fresh_token_does_not_need_refresh() {
        let now = Utc::now();
        let state = TokenState::new(Some(now + Duration::seconds(3600)));
        assert!(!state.needs_refresh_at(now));
    }

    #[test]
    fn token_close_to_expiry_needs_refresh() {
        let now = Utc::now();
        let state = TokenState::new(Some(now + Duration::seconds(299)));
        assert!(state.needs_refresh_at(now));
    }

    #[test]
    fn expired_token_needs_refresh() {
        let now = Utc::now();
        let state = TokenState::new(Some(now - Duration::seconds(10)));
        assert!(state.needs_refresh_at(now));
    }

    #[test]
    fn holder_reports_stored_expiry() {
        let expires_at = Utc::now() + Duration::seconds(3600);
        assert_eq!(TokenState::new(Some(expires_at)).expires_at(), Some(expires_at));
        assert_eq!(TokenState::default().expires_at(), None);
    }

    #[test]
    fn unknown_expiry_is_left_alone() {
        assert!(!TokenState::default().needs_refresh());
    }
}
