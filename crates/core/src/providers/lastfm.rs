//! Last.fm API client.
//!
//! Uses the public `album.getinfo` method, authenticated by API key only.
//! Listener and play counts come back as strings and are parsed
//! individually, so a payload can contribute one count without the other.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::LastfmConfig;

use super::{AlbumStats, Pacer, ProviderError, StatsSource};

const DEFAULT_BASE_URL: &str = "https://ws.audioscrobbler.com/2.0/";

/// Last.fm API client.
pub struct LastfmClient {
    client: Client,
    base_url: String,
    api_key: String,
    pacer: Pacer,
}

impl LastfmClient {
    /// Create a new Last.fm client.
    pub fn new(config: LastfmConfig) -> Result<Self, ProviderError> {
        if config.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Last.fm API key is required".to_string(),
            ));
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: config
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: config.api_key,
            pacer: Pacer::new(Duration::from_millis(config.rate_limit.min_interval_ms)),
        })
    }
}

#[async_trait]
impl StatsSource for LastfmClient {
    async fn album_stats(&self, artist: &str, title: &str) -> Result<AlbumStats, ProviderError> {
        self.pacer.pace().await;

        debug!(artist = artist, album = title, "Last.fm album lookup");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("method", "album.getinfo"),
                ("api_key", self.api_key.as_str()),
                ("artist", artist),
                ("album", title),
                ("format", "json"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == 429 {
            warn!("Last.fm rate limit exceeded");
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let payload: AlbumInfoResponse = response.json().await.map_err(|e| {
            ProviderError::ParseError(format!("failed to parse album info: {}", e))
        })?;

        // Unknown albums come back as an error payload with HTTP 200;
        // they simply contribute no counts.
        Ok(payload
            .album
            .map(AlbumInfo::into_stats)
            .unwrap_or_default())
    }
}

// ============================================================================
// Last.fm API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct AlbumInfoResponse {
    #[serde(default)]
    album: Option<AlbumInfo>,
}

#[derive(Debug, Deserialize)]
struct AlbumInfo {
    #[serde(default)]
    listeners: Option<String>,
    #[serde(default)]
    playcount: Option<String>,
}

impl AlbumInfo {
    fn into_stats(self) -> AlbumStats {
        AlbumStats {
            listeners: self.listeners.and_then(|s| s.parse().ok()),
            playcount: self.playcount.and_then(|s| s.parse().ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;

    #[test]
    fn test_new_requires_api_key() {
        let config = LastfmConfig {
            api_key: String::new(),
            base_url: None,
            rate_limit: RateLimitConfig::default(),
        };
        assert!(matches!(
            LastfmClient::new(config),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_stats_parsing_both_counts() {
        let payload: AlbumInfoResponse = serde_json::from_str(
            r#"{"album": {"name": "Test", "listeners": "12345", "playcount": "678901"}}"#,
        )
        .unwrap();

        let stats = payload.album.unwrap().into_stats();
        assert_eq!(stats.listeners, Some(12345));
        assert_eq!(stats.playcount, Some(678901));
    }

    #[test]
    fn test_stats_parsing_partial_counts() {
        let payload: AlbumInfoResponse =
            serde_json::from_str(r#"{"album": {"listeners": "42"}}"#).unwrap();

        let stats = payload.album.unwrap().into_stats();
        assert_eq!(stats.listeners, Some(42));
        assert_eq!(stats.playcount, None);
    }

    #[test]
    fn test_stats_parsing_garbled_count() {
        let payload: AlbumInfoResponse = serde_json::from_str(
            r#"{"album": {"listeners": "many", "playcount": "100"}}"#,
        )
        .unwrap();

        let stats = payload.album.unwrap().into_stats();
        assert_eq!(stats.listeners, None);
        assert_eq!(stats.playcount, Some(100));
    }

    #[test]
    fn test_error_payload_yields_no_stats() {
        // Last.fm reports unknown albums with HTTP 200 and an error body
        let payload: AlbumInfoResponse =
            serde_json::from_str(r#"{"error": 6, "message": "Album not found"}"#).unwrap();
        assert!(payload.album.is_none());
    }
}
