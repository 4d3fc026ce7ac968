use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use buzzrank_core::{
    load_config, sort_releases, validate_config, LastfmClient, Pipeline, PipelineOptions,
    SanitizedConfig, SortKey, SpotifyClient,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine config path
    let config_path = std::env::var("BUZZRANK_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = SanitizedConfig::from(&config);
    info!(
        year = %sanitized.pipeline.year,
        collections = sanitized.pipeline.playlists.len(),
        "Configuration loaded"
    );

    let catalog = Arc::new(
        SpotifyClient::new(config.spotify.clone()).context("Failed to create Spotify client")?,
    );
    let stats = Arc::new(
        LastfmClient::new(config.lastfm.clone()).context("Failed to create Last.fm client")?,
    );

    let pipeline = Pipeline::new(catalog, stats, PipelineOptions::from_config(&config));
    let mut report = pipeline.run().await.context("Pipeline run failed")?;

    for (collection, cause) in &report.source_errors {
        warn!(collection = %collection, error = %cause, "Collection contributed no releases");
    }

    sort_releases(&mut report.releases, SortKey::Score);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &report.releases).context("Failed to write results")?;
    writeln!(out)?;

    info!(
        releases = report.releases.len(),
        popularity_failures = report.popularity_failures,
        stats_failures = report.stats_failures,
        duration_ms = report.duration_ms,
        "Done"
    );

    Ok(())
}
