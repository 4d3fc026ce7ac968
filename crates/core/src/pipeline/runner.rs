//! Pipeline orchestration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use tracing::{info, warn};

use crate::config::{Config, RateLimitConfig, ScoreWeights};
use crate::providers::{ReleaseCatalog, StatsSource};
use crate::release::Release;

use super::enrich::{enrich_community_stats, enrich_popularity};
use super::merge::{filter_by_year, merge_collections};
use super::score::score_batch;
use super::types::{PipelineError, PipelineReport};

/// Options consumed by the pipeline, decoupled from provider credentials.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Target release year (4-digit string).
    pub year: String,
    /// Collection ids to aggregate.
    pub collections: Vec<String>,
    /// Composite score weights.
    pub weights: ScoreWeights,
    /// Concurrency and retry budget for catalog popularity lookups.
    pub catalog_limits: RateLimitConfig,
    /// Concurrency and retry budget for community-stats lookups.
    pub stats_limits: RateLimitConfig,
}

impl PipelineOptions {
    /// Extract the pipeline-relevant parts of the full configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            year: config.pipeline.year.clone(),
            collections: config.pipeline.playlists.clone(),
            weights: config.pipeline.weights.clone(),
            catalog_limits: config.spotify.rate_limit.clone(),
            stats_limits: config.lastfm.rate_limit.clone(),
        }
    }
}

/// The aggregation-enrichment-scoring pipeline.
pub struct Pipeline {
    catalog: Arc<dyn ReleaseCatalog>,
    stats: Arc<dyn StatsSource>,
    options: PipelineOptions,
}

impl Pipeline {
    /// Create a new pipeline over the given providers.
    pub fn new(
        catalog: Arc<dyn ReleaseCatalog>,
        stats: Arc<dyn StatsSource>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            catalog,
            stats,
            options,
        }
    }

    /// Run the pipeline once, producing a fresh scored batch.
    ///
    /// Only an authentication failure aborts the run; failing collections
    /// and failing lookups degrade the batch and are surfaced in the report.
    pub async fn run(&self) -> Result<PipelineReport, PipelineError> {
        let start = Instant::now();

        self.catalog
            .authenticate()
            .await
            .map_err(PipelineError::Auth)?;

        // Fetch all configured collections; one failing collection only
        // costs its own releases.
        let fetches = self.options.collections.iter().map(|id| {
            let catalog = self.catalog.clone();
            let id = id.clone();
            async move {
                let result = catalog.collection_releases(&id).await;
                (id, result)
            }
        });
        let fetched = join_all(fetches).await;

        let mut source_errors: HashMap<String, String> = HashMap::new();
        let mut collections: Vec<Vec<Release>> = Vec::new();
        for (id, result) in fetched {
            match result {
                Ok(releases) => {
                    info!(collection = %id, releases = releases.len(), "Collection fetched");
                    collections.push(releases);
                }
                Err(e) => {
                    warn!(collection = %id, error = %e, "Collection fetch failed");
                    source_errors.insert(id, e.to_string());
                }
            }
        }

        let merged = merge_collections(collections);
        let mut releases = filter_by_year(merged, &self.options.year);
        info!(
            releases = releases.len(),
            year = %self.options.year,
            "Merged and filtered batch"
        );

        let popularity_failures = enrich_popularity(
            self.catalog.as_ref(),
            &mut releases,
            &self.options.catalog_limits,
        )
        .await;
        let stats_failures = enrich_community_stats(
            self.stats.as_ref(),
            &mut releases,
            &self.options.stats_limits,
        )
        .await;

        let today = Utc::now().date_naive();
        score_batch(&mut releases, today, &self.options.weights);

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            releases = releases.len(),
            popularity_failures,
            stats_failures,
            duration_ms,
            "Pipeline run complete"
        );

        Ok(PipelineReport {
            releases,
            source_errors,
            popularity_failures,
            stats_failures,
            duration_ms,
        })
    }
}
