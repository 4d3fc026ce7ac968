//! Spotify Web API client.
//!
//! Covers the three operations the pipeline needs: the client-credentials
//! token exchange, playlist-tracks pagination and per-album popularity.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::SpotifyConfig;
use crate::release::Release;

use super::{Pacer, ProviderError, ReleaseCatalog};

const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_BASE_URL: &str = "https://api.spotify.com/v1";

/// Spotify Web API client.
pub struct SpotifyClient {
    client: Client,
    token_url: String,
    base_url: String,
    client_id: String,
    client_secret: String,
    page_size: u32,
    token: RwLock<Option<String>>,
    pacer: Pacer,
}

impl SpotifyClient {
    /// Create a new client. No network activity happens until
    /// [`authenticate`](ReleaseCatalog::authenticate).
    pub fn new(config: SpotifyConfig) -> Result<Self, ProviderError> {
        if config.client_id.is_empty() || config.client_secret.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Spotify client id and secret are required".to_string(),
            ));
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            token_url: config
                .token_url
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            base_url: config
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client_id: config.client_id,
            client_secret: config.client_secret,
            page_size: config.page_size,
            token: RwLock::new(None),
            pacer: Pacer::new(Duration::from_millis(config.rate_limit.min_interval_ms)),
        })
    }

    async fn bearer_token(&self) -> Result<String, ProviderError> {
        self.token
            .read()
            .await
            .clone()
            .ok_or(ProviderError::NotAuthenticated)
    }
}

#[async_trait]
impl ReleaseCatalog for SpotifyClient {
    async fn authenticate(&self) -> Result<(), ProviderError> {
        self.pacer.pace().await;

        debug!("Exchanging client credentials for access token");

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthFailed(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            ProviderError::AuthFailed(format!("failed to parse token response: {}", e))
        })?;

        *self.token.write().await = Some(token.access_token);
        Ok(())
    }

    async fn collection_releases(
        &self,
        collection_id: &str,
    ) -> Result<Vec<Release>, ProviderError> {
        let token = self.bearer_token().await?;

        let mut releases = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut pages = 0u32;
        let mut next_url = Some(format!(
            "{}/playlists/{}/tracks?limit={}&offset=0",
            self.base_url,
            urlencoding::encode(collection_id),
            self.page_size
        ));

        while let Some(url) = next_url {
            self.pacer.pace().await;
            debug!(
                collection = collection_id,
                page = pages,
                "Fetching playlist page"
            );

            let response = self.client.get(&url).bearer_auth(&token).send().await?;

            let status = response.status();
            if status == 429 {
                warn!(collection = collection_id, "Spotify rate limit exceeded");
                return Err(ProviderError::RateLimited);
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ProviderError::ApiError {
                    status: status.as_u16(),
                    message: body.chars().take(200).collect(),
                });
            }

            let page: TracksPage = response.json().await.map_err(|e| {
                ProviderError::ParseError(format!("failed to parse playlist page: {}", e))
            })?;

            for item in page.items {
                // Local tracks and removed episodes carry no album
                let Some(album) = item.track.and_then(|t| t.album) else {
                    continue;
                };
                let Some(release) = album.into_release() else {
                    continue;
                };
                if seen.insert(release.id.clone()) {
                    releases.push(release);
                }
            }

            next_url = page.next;
            pages += 1;
        }

        debug!(
            collection = collection_id,
            releases = releases.len(),
            pages = pages,
            "Collection fetch complete"
        );

        Ok(releases)
    }

    async fn album_popularity(&self, album_id: &str) -> Result<Option<u8>, ProviderError> {
        let token = self.bearer_token().await?;

        self.pacer.pace().await;
        debug!(album = album_id, "Fetching album popularity");

        let url = format!("{}/albums/{}", self.base_url, urlencoding::encode(album_id));
        let response = self.client.get(&url).bearer_auth(&token).send().await?;

        let status = response.status();
        if status == 429 {
            warn!(album = album_id, "Spotify rate limit exceeded");
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let album: AlbumDetails = response.json().await.map_err(|e| {
            ProviderError::ParseError(format!("failed to parse album response: {}", e))
        })?;

        Ok(album.popularity)
    }
}

// ============================================================================
// Spotify API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TracksPage {
    #[serde(default)]
    items: Vec<PageItem>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageItem {
    #[serde(default)]
    track: Option<TrackEntry>,
}

#[derive(Debug, Deserialize)]
struct TrackEntry {
    #[serde(default)]
    album: Option<AlbumEntry>,
}

#[derive(Debug, Deserialize)]
struct AlbumEntry {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistEntry>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default = "default_total_tracks")]
    total_tracks: u32,
    #[serde(default)]
    external_urls: ExternalUrls,
    #[serde(default)]
    images: Vec<ImageEntry>,
    #[serde(default)]
    album_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArtistEntry {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalUrls {
    #[serde(default)]
    spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageEntry {
    url: String,
}

#[derive(Debug, Deserialize)]
struct AlbumDetails {
    #[serde(default)]
    popularity: Option<u8>,
}

fn default_total_tracks() -> u32 {
    1
}

impl AlbumEntry {
    /// Map to a release, or `None` when the entry lacks the information the
    /// pipeline needs. The id falls back to the trailing segment of the
    /// external URL when the catalog omits it.
    fn into_release(self) -> Option<Release> {
        let external_url = self.external_urls.spotify?;
        let id = match self.id.filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => external_url
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .filter(|s| !s.is_empty())?
                .to_string(),
        };
        let release_date = self.release_date.filter(|d| !d.is_empty())?;

        Some(Release {
            id,
            name: self.name,
            artists: self.artists.into_iter().map(|a| a.name).collect(),
            release_date,
            total_tracks: self.total_tracks.max(1),
            external_url,
            image_url: self.images.into_iter().next().map(|i| i.url),
            release_type: self.album_type.unwrap_or_else(|| "unknown".to_string()),
            popularity: None,
            community_listeners: None,
            community_playcount: None,
            days_since_release: None,
            listeners_per_day: None,
            playcount_per_day: None,
            composite_score: None,
        })
    }
}
