//! Testing utilities and mock implementations for end-to-end tests.
//!
//! This module provides mock implementations of both provider traits,
//! allowing full pipeline runs without real infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use buzzrank_core::testing::{fixtures, MockReleaseCatalog, MockStatsSource};
//!
//! let catalog = MockReleaseCatalog::new();
//! catalog.add_collection("p1", vec![fixtures::release("a", "Album", "Artist", "2025-01-01")]).await;
//! catalog.set_popularity("a", 80).await;
//!
//! let stats = MockStatsSource::new();
//! stats.set_stats("Artist", "Album", Some(1000), Some(5000)).await;
//!
//! // Wire into a Pipeline...
//! ```

mod mock_catalog;
mod mock_stats;

pub use mock_catalog::{MockReleaseCatalog, RecordedCatalogCall};
pub use mock_stats::{MockStatsSource, RecordedStatsLookup};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::release::Release;

    /// Create a test release with reasonable defaults.
    pub fn release(id: &str, name: &str, artist: &str, release_date: &str) -> Release {
        Release {
            id: id.to_string(),
            name: name.to_string(),
            artists: vec![artist.to_string()],
            release_date: release_date.to_string(),
            total_tracks: 10,
            external_url: format!("https://open.spotify.com/album/{}", id),
            image_url: Some(format!("https://i.scdn.co/image/{}", id)),
            release_type: "album".to_string(),
            popularity: None,
            community_listeners: None,
            community_playcount: None,
            days_since_release: None,
            listeners_per_day: None,
            playcount_per_day: None,
            composite_score: None,
        }
    }

    /// Create a fully enriched test release.
    pub fn enriched_release(
        id: &str,
        name: &str,
        artist: &str,
        release_date: &str,
        popularity: u8,
        listeners: u64,
        playcount: u64,
    ) -> Release {
        let mut release = release(id, name, artist, release_date);
        release.popularity = Some(popularity);
        release.community_listeners = Some(listeners);
        release.community_playcount = Some(playcount);
        release
    }
}
