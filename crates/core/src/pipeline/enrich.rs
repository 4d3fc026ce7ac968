//! Per-release enrichment with bounded concurrency and retry.
//!
//! Lookups fan out up to the provider's concurrency limit while the
//! provider's pacer keeps the actual request rate within budget. A failing
//! lookup only costs its own release: the field stays absent and the batch
//! proceeds.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::RateLimitConfig;
use crate::providers::{AlbumStats, ProviderError, ReleaseCatalog, StatsSource};
use crate::release::Release;

/// Retry budget for transient provider failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retry attempts on top of the initial try.
    pub max_retries: u32,
    /// Delay before the first retry, doubled per attempt.
    pub base_delay: Duration,
    /// Cap on any single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Derive a policy from a provider's rate limit configuration.
    pub fn from_limits(limits: &RateLimitConfig) -> Self {
        Self {
            max_retries: limits.max_retries,
            base_delay: Duration::from_millis(limits.backoff_ms),
            max_delay: Duration::from_secs(30),
        }
    }

    /// Delay before the given retry attempt (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Run a provider call, retrying transient failures per the policy.
async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut call: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                debug!(
                    what = what,
                    attempt = attempt + 1,
                    error = %e,
                    "Transient failure, retrying in {:?}",
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Attach catalog popularity to every release in the batch.
///
/// Lookups that fail after retries leave `popularity` absent. Returns how
/// many releases failed.
pub async fn enrich_popularity(
    catalog: &dyn ReleaseCatalog,
    releases: &mut [Release],
    limits: &RateLimitConfig,
) -> u32 {
    let policy = RetryPolicy::from_limits(limits);

    let results: Vec<(usize, Option<u8>, bool)> =
        stream::iter(releases.iter().enumerate().map(|(idx, release)| {
            let id = release.id.clone();
            let policy = policy.clone();
            async move {
                match with_retry(&policy, "album popularity", || catalog.album_popularity(&id))
                    .await
                {
                    Ok(popularity) => (idx, popularity, false),
                    Err(e) => {
                        warn!(album = %id, error = %e, "Popularity lookup failed");
                        (idx, None, true)
                    }
                }
            }
        }))
        .buffer_unordered(limits.concurrency)
        .collect()
        .await;

    let mut failures = 0;
    for (idx, popularity, failed) in results {
        releases[idx].popularity = popularity;
        if failed {
            failures += 1;
        }
    }
    failures
}

/// Attach community listener and play counts to every release in the batch.
///
/// Releases with no credited artist skip the lookup without a request.
/// Lookups that fail after retries leave both counts absent. Returns how
/// many releases failed.
pub async fn enrich_community_stats(
    stats: &dyn StatsSource,
    releases: &mut [Release],
    limits: &RateLimitConfig,
) -> u32 {
    let policy = RetryPolicy::from_limits(limits);

    let results: Vec<(usize, AlbumStats, bool)> =
        stream::iter(releases.iter().enumerate().map(|(idx, release)| {
            let artist = release.primary_artist().map(|a| a.to_string());
            let title = release.name.clone();
            let policy = policy.clone();
            async move {
                let Some(artist) = artist else {
                    return (idx, AlbumStats::default(), false);
                };
                match with_retry(&policy, "album stats", || stats.album_stats(&artist, &title))
                    .await
                {
                    Ok(counts) => (idx, counts, false),
                    Err(e) => {
                        warn!(
                            artist = %artist,
                            album = %title,
                            error = %e,
                            "Community stats lookup failed"
                        );
                        (idx, AlbumStats::default(), true)
                    }
                }
            }
        }))
        .buffer_unordered(limits.concurrency)
        .collect()
        .await;

    let mut failures = 0;
    for (idx, counts, failed) in results {
        releases[idx].community_listeners = counts.listeners;
        releases[idx].community_playcount = counts.playcount;
        if failed {
            failures += 1;
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockReleaseCatalog, MockStatsSource, RecordedCatalogCall};

    fn fast_limits() -> RateLimitConfig {
        RateLimitConfig {
            concurrency: 4,
            min_interval_ms: 0,
            max_retries: 2,
            backoff_ms: 1,
        }
    }

    #[test]
    fn test_retry_policy_delays_double_and_cap() {
        let policy = RetryPolicy {
            max_retries: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
        };

        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(350)); // capped
        assert_eq!(policy.delay_for(10), Duration::from_millis(350));
    }

    #[tokio::test]
    async fn test_enrich_popularity_fills_fields() {
        let catalog = MockReleaseCatalog::new();
        catalog.set_popularity("a", 80).await;
        catalog.set_popularity("b", 35).await;

        let mut batch = vec![
            fixtures::release("a", "A", "Artist", "2025"),
            fixtures::release("b", "B", "Artist", "2025"),
            fixtures::release("c", "C", "Artist", "2025"),
        ];

        let failures = enrich_popularity(&catalog, &mut batch, &fast_limits()).await;
        assert_eq!(failures, 0);
        assert_eq!(batch[0].popularity, Some(80));
        assert_eq!(batch[1].popularity, Some(35));
        // Catalog has no popularity for "c": absent, but not a failure
        assert_eq!(batch[2].popularity, None);
    }

    #[tokio::test]
    async fn test_enrich_popularity_isolates_failures() {
        let catalog = MockReleaseCatalog::new();
        catalog.set_popularity("a", 80).await;
        catalog.set_popularity("c", 60).await;
        catalog.fail_album("b", 404).await;

        let mut batch = vec![
            fixtures::release("a", "A", "Artist", "2025"),
            fixtures::release("b", "B", "Artist", "2025"),
            fixtures::release("c", "C", "Artist", "2025"),
        ];

        let failures = enrich_popularity(&catalog, &mut batch, &fast_limits()).await;
        assert_eq!(failures, 1);
        assert_eq!(batch[0].popularity, Some(80));
        assert_eq!(batch[1].popularity, None);
        assert_eq!(batch[2].popularity, Some(60));
    }

    #[tokio::test]
    async fn test_enrich_popularity_retries_transient_errors() {
        let catalog = MockReleaseCatalog::new();
        catalog.set_popularity("a", 42).await;
        catalog.set_next_error(ProviderError::RateLimited).await;

        let mut batch = vec![fixtures::release("a", "A", "Artist", "2025")];

        let failures = enrich_popularity(&catalog, &mut batch, &fast_limits()).await;
        assert_eq!(failures, 0);
        assert_eq!(batch[0].popularity, Some(42));

        let lookups = catalog
            .recorded_calls()
            .await
            .into_iter()
            .filter(|c| matches!(c, RecordedCatalogCall::AlbumPopularity { .. }))
            .count();
        assert_eq!(lookups, 2);
    }

    #[tokio::test]
    async fn test_enrich_popularity_does_not_retry_terminal_errors() {
        let catalog = MockReleaseCatalog::new();
        catalog.fail_album("a", 404).await;

        let mut batch = vec![fixtures::release("a", "A", "Artist", "2025")];

        let failures = enrich_popularity(&catalog, &mut batch, &fast_limits()).await;
        assert_eq!(failures, 1);
        assert_eq!(catalog.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_enrich_stats_fills_fields() {
        let stats = MockStatsSource::new();
        stats.set_stats("Artist", "A", Some(1000), Some(5000)).await;
        stats.set_stats("Artist", "B", Some(20), None).await;

        let mut batch = vec![
            fixtures::release("a", "A", "Artist", "2025"),
            fixtures::release("b", "B", "Artist", "2025"),
        ];

        let failures = enrich_community_stats(&stats, &mut batch, &fast_limits()).await;
        assert_eq!(failures, 0);
        assert_eq!(batch[0].community_listeners, Some(1000));
        assert_eq!(batch[0].community_playcount, Some(5000));
        assert_eq!(batch[1].community_listeners, Some(20));
        assert_eq!(batch[1].community_playcount, None);
    }

    #[tokio::test]
    async fn test_enrich_stats_isolates_failures() {
        let stats = MockStatsSource::new();
        stats.set_stats("Artist", "A", Some(1000), Some(5000)).await;
        stats.fail_lookup("Artist", "B").await;

        let mut batch = vec![
            fixtures::release("a", "A", "Artist", "2025"),
            fixtures::release("b", "B", "Artist", "2025"),
        ];

        let failures = enrich_community_stats(&stats, &mut batch, &fast_limits()).await;
        assert_eq!(failures, 1);
        assert_eq!(batch[0].community_listeners, Some(1000));
        assert_eq!(batch[1].community_listeners, None);
        assert_eq!(batch[1].community_playcount, None);
    }

    #[tokio::test]
    async fn test_enrich_stats_skips_artistless_releases() {
        let stats = MockStatsSource::new();

        let mut release = fixtures::release("a", "A", "Artist", "2025");
        release.artists.clear();
        let mut batch = vec![release];

        let failures = enrich_community_stats(&stats, &mut batch, &fast_limits()).await;
        assert_eq!(failures, 0);
        assert_eq!(stats.call_count().await, 0);
        assert_eq!(batch[0].community_listeners, None);
    }
}
