use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub spotify: SpotifyConfig,
    pub lastfm: LastfmConfig,
    pub pipeline: PipelineConfig,
}

/// Spotify catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpotifyConfig {
    /// OAuth client id for the client-credentials grant
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Page size for playlist pagination (default: 100, the API maximum)
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Token endpoint override (default: https://accounts.spotify.com/api/token)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    /// API base URL override (default: https://api.spotify.com/v1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Pacing, concurrency and retry budget for this provider
    #[serde(default = "default_spotify_rate_limit")]
    pub rate_limit: RateLimitConfig,
}

fn default_page_size() -> u32 {
    100
}

/// Last.fm lookup configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LastfmConfig {
    /// Last.fm API key
    pub api_key: String,
    /// API base URL override (default: https://ws.audioscrobbler.com/2.0/)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Pacing, concurrency and retry budget for this provider
    #[serde(default = "default_lastfm_rate_limit")]
    pub rate_limit: RateLimitConfig,
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Target release year as a 4-digit string
    pub year: String,
    /// Playlist ids to collect releases from
    pub playlists: Vec<String>,
    /// Composite score weights
    #[serde(default)]
    pub weights: ScoreWeights,
}

/// Rate limiting and retry budget for one provider
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Max in-flight lookups during enrichment
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Minimum interval between requests to the provider, in milliseconds
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    /// Retry attempts for transient failures, on top of the initial try
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base backoff delay in milliseconds, doubled per attempt
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_concurrency() -> usize {
    4
}

fn default_min_interval_ms() -> u64 {
    250
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    500
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            min_interval_ms: default_min_interval_ms(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_spotify_rate_limit() -> RateLimitConfig {
    // Spotify tolerates tighter spacing than the community provider
    RateLimitConfig {
        min_interval_ms: 100,
        ..RateLimitConfig::default()
    }
}

fn default_lastfm_rate_limit() -> RateLimitConfig {
    RateLimitConfig {
        concurrency: 2,
        ..RateLimitConfig::default()
    }
}

/// Weights for the composite score terms
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoreWeights {
    #[serde(default = "default_popularity_weight")]
    pub popularity: f64,
    #[serde(default = "default_listeners_weight")]
    pub listeners: f64,
    #[serde(default = "default_playcount_weight")]
    pub playcount: f64,
}

fn default_popularity_weight() -> f64 {
    0.5
}

fn default_listeners_weight() -> f64 {
    0.3
}

fn default_playcount_weight() -> f64 {
    0.2
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            popularity: default_popularity_weight(),
            listeners: default_listeners_weight(),
            playcount: default_playcount_weight(),
        }
    }
}

/// Sanitized config for logging and display (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub spotify: SanitizedSpotifyConfig,
    pub lastfm: SanitizedLastfmConfig,
    pub pipeline: PipelineConfig,
}

/// Sanitized Spotify config (client secret hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSpotifyConfig {
    pub client_id: String,
    pub client_secret_configured: bool,
    pub page_size: u32,
    pub rate_limit: RateLimitConfig,
}

/// Sanitized Last.fm config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedLastfmConfig {
    pub api_key_configured: bool,
    pub rate_limit: RateLimitConfig,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            spotify: SanitizedSpotifyConfig {
                client_id: config.spotify.client_id.clone(),
                client_secret_configured: !config.spotify.client_secret.is_empty(),
                page_size: config.spotify.page_size,
                rate_limit: config.spotify.rate_limit.clone(),
            },
            lastfm: SanitizedLastfmConfig {
                api_key_configured: !config.lastfm.api_key.is_empty(),
                rate_limit: config.lastfm.rate_limit.clone(),
            },
            pipeline: config.pipeline.clone(),
        }
    }
}
