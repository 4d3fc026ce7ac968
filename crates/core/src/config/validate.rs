use super::{types::Config, ConfigError};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Validate configuration
/// Currently validates:
/// - Credentials are present (non-empty)
/// - Target year is a 4-digit string
/// - At least one playlist id, none empty
/// - Page size within the API's 1..=100 range
/// - Score weights are non-negative and sum to 1
/// - Provider concurrency is at least 1
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Credentials
    if config.spotify.client_id.is_empty() {
        return Err(ConfigError::ValidationError(
            "spotify.client_id cannot be empty".to_string(),
        ));
    }
    if config.spotify.client_secret.is_empty() {
        return Err(ConfigError::ValidationError(
            "spotify.client_secret cannot be empty".to_string(),
        ));
    }
    if config.lastfm.api_key.is_empty() {
        return Err(ConfigError::ValidationError(
            "lastfm.api_key cannot be empty".to_string(),
        ));
    }

    // Pipeline
    let year = &config.pipeline.year;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::ValidationError(format!(
            "pipeline.year must be a 4-digit string, got {:?}",
            year
        )));
    }
    if config.pipeline.playlists.is_empty() {
        return Err(ConfigError::ValidationError(
            "pipeline.playlists cannot be empty".to_string(),
        ));
    }
    if config.pipeline.playlists.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::ValidationError(
            "pipeline.playlists cannot contain empty ids".to_string(),
        ));
    }

    // Page size
    if config.spotify.page_size == 0 || config.spotify.page_size > 100 {
        return Err(ConfigError::ValidationError(format!(
            "spotify.page_size must be between 1 and 100, got {}",
            config.spotify.page_size
        )));
    }

    // Weights
    let w = &config.pipeline.weights;
    if w.popularity < 0.0 || w.listeners < 0.0 || w.playcount < 0.0 {
        return Err(ConfigError::ValidationError(
            "pipeline.weights cannot be negative".to_string(),
        ));
    }
    let sum = w.popularity + w.listeners + w.playcount;
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ConfigError::ValidationError(format!(
            "pipeline.weights must sum to 1.0, got {}",
            sum
        )));
    }

    // Rate limits
    for (name, limits) in [
        ("spotify", &config.spotify.rate_limit),
        ("lastfm", &config.lastfm.rate_limit),
    ] {
        if limits.concurrency == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{}.rate_limit.concurrency must be at least 1",
                name
            )));
        }
    }

    Ok(())
}
