//! Mock community-stats source for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::providers::{AlbumStats, ProviderError, StatsSource};

/// A recorded stats lookup for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedStatsLookup {
    pub artist: String,
    pub title: String,
}

/// Mock implementation of the `StatsSource` trait.
///
/// Unknown albums resolve to empty stats (the real provider reports unknown
/// albums as an error payload with no counts); specific lookups can be made
/// to fail persistently, and a one-shot error can be injected for retry
/// tests.
pub struct MockStatsSource {
    stats: Arc<RwLock<HashMap<(String, String), AlbumStats>>>,
    failing: Arc<RwLock<HashSet<(String, String)>>>,
    next_error: Arc<RwLock<Option<ProviderError>>>,
    calls: Arc<RwLock<Vec<RecordedStatsLookup>>>,
}

impl Default for MockStatsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStatsSource {
    /// Create a new empty mock stats source.
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(HashMap::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            next_error: Arc::new(RwLock::new(None)),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register counts for an artist/title pair.
    pub async fn set_stats(
        &self,
        artist: &str,
        title: &str,
        listeners: Option<u64>,
        playcount: Option<u64>,
    ) {
        self.stats.write().await.insert(
            (artist.to_string(), title.to_string()),
            AlbumStats {
                listeners,
                playcount,
            },
        );
    }

    /// Make a specific lookup fail persistently.
    pub async fn fail_lookup(&self, artist: &str, title: &str) {
        self.failing
            .write()
            .await
            .insert((artist.to_string(), title.to_string()));
    }

    /// Configure the next lookup to fail with the given error.
    pub async fn set_next_error(&self, error: ProviderError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get all recorded lookups.
    pub async fn recorded_lookups(&self) -> Vec<RecordedStatsLookup> {
        self.calls.read().await.clone()
    }

    /// Get the number of lookups performed.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl StatsSource for MockStatsSource {
    async fn album_stats(&self, artist: &str, title: &str) -> Result<AlbumStats, ProviderError> {
        self.calls.write().await.push(RecordedStatsLookup {
            artist: artist.to_string(),
            title: title.to_string(),
        });

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let key = (artist.to_string(), title.to_string());
        if self.failing.read().await.contains(&key) {
            return Err(ProviderError::ApiError {
                status: 500,
                message: "injected failure".to_string(),
            });
        }

        Ok(self
            .stats
            .read()
            .await
            .get(&key)
            .copied()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stats_lookup() {
        let stats = MockStatsSource::new();
        stats
            .set_stats("Artist", "Album", Some(1000), Some(5000))
            .await;

        let result = stats.album_stats("Artist", "Album").await.unwrap();
        assert_eq!(result.listeners, Some(1000));
        assert_eq!(result.playcount, Some(5000));

        // Unknown albums resolve to empty stats, not an error
        let result = stats.album_stats("Artist", "Other").await.unwrap();
        assert_eq!(result, AlbumStats::default());
    }

    #[tokio::test]
    async fn test_failing_lookup() {
        let stats = MockStatsSource::new();
        stats.fail_lookup("Artist", "Album").await;

        assert!(stats.album_stats("Artist", "Album").await.is_err());
        assert!(stats.album_stats("Artist", "Other").await.is_ok());
    }

    #[tokio::test]
    async fn test_next_error_is_consumed() {
        let stats = MockStatsSource::new();
        stats.set_next_error(ProviderError::RateLimited).await;

        assert!(stats.album_stats("A", "B").await.is_err());
        assert!(stats.album_stats("A", "B").await.is_ok());
    }

    #[tokio::test]
    async fn test_recorded_lookups() {
        let stats = MockStatsSource::new();
        stats.album_stats("Artist", "Album").await.ok();

        let lookups = stats.recorded_lookups().await;
        assert_eq!(lookups.len(), 1);
        assert_eq!(lookups[0].artist, "Artist");
        assert_eq!(lookups[0].title, "Album");
        assert_eq!(stats.call_count().await, 1);
    }
}
