//! Clients for the two metadata providers.
//!
//! The pipeline consumes providers through the `ReleaseCatalog` and
//! `StatsSource` traits so tests can substitute mocks; the production
//! implementations are `SpotifyClient` and `LastfmClient`.

mod lastfm;
mod pacer;
mod spotify;

pub use lastfm::LastfmClient;
pub use pacer::Pacer;
pub use spotify::SpotifyClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::release::Release;

/// Errors that can occur when talking to a provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Credential exchange was rejected.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// An operation needing a token ran before `authenticate`.
    #[error("not authenticated, call authenticate() first")]
    NotAuthenticated,

    /// Rate limit exceeded (HTTP 429).
    #[error("rate limit exceeded")]
    RateLimited,

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing credentials, etc.).
    #[error("client not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Whether retrying the same request can reasonably succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Http(e) => e.is_timeout() || e.is_connect(),
            ProviderError::RateLimited => true,
            ProviderError::ApiError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Community statistics for one album lookup.
///
/// A successful lookup may carry either count, both or neither; a failed
/// lookup yields the default (both absent).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumStats {
    pub listeners: Option<u64>,
    pub playcount: Option<u64>,
}

/// The catalog releases are collected from and popularity is read from.
#[async_trait]
pub trait ReleaseCatalog: Send + Sync {
    /// Exchange client credentials for a bearer token. Must complete before
    /// any other operation; failure is fatal for the run.
    async fn authenticate(&self) -> Result<(), ProviderError>;

    /// Collect the releases referenced by one collection, following
    /// pagination to the end. Deduplicated by release id within the
    /// collection, first occurrence wins.
    async fn collection_releases(
        &self,
        collection_id: &str,
    ) -> Result<Vec<Release>, ProviderError>;

    /// Popularity (0-100) for one release, if the catalog reports one.
    async fn album_popularity(&self, album_id: &str) -> Result<Option<u8>, ProviderError>;
}

/// The provider community statistics are looked up from.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Look up listener and play counts by artist and album title.
    async fn album_stats(&self, artist: &str, title: &str) -> Result<AlbumStats, ProviderError>;
}
