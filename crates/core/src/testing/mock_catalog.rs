//! Mock release catalog for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::providers::{ProviderError, ReleaseCatalog};
use crate::release::Release;

/// A recorded catalog call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCatalogCall {
    Authenticate,
    CollectionReleases { collection_id: String },
    AlbumPopularity { album_id: String },
}

/// Mock implementation of the `ReleaseCatalog` trait.
///
/// Provides controllable behavior for testing:
/// - Configurable collections and popularity values
/// - Persistent per-collection and per-album failure injection
/// - One-shot error injection (consumed by the next call) for retry tests
/// - Call recording for assertions
pub struct MockReleaseCatalog {
    collections: Arc<RwLock<HashMap<String, Vec<Release>>>>,
    popularity: Arc<RwLock<HashMap<String, u8>>>,
    failing_collections: Arc<RwLock<HashMap<String, String>>>,
    failing_albums: Arc<RwLock<HashMap<String, u16>>>,
    auth_error: Arc<RwLock<Option<String>>>,
    next_error: Arc<RwLock<Option<ProviderError>>>,
    calls: Arc<RwLock<Vec<RecordedCatalogCall>>>,
}

impl Default for MockReleaseCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockReleaseCatalog {
    /// Create a new empty mock catalog.
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            popularity: Arc::new(RwLock::new(HashMap::new())),
            failing_collections: Arc::new(RwLock::new(HashMap::new())),
            failing_albums: Arc::new(RwLock::new(HashMap::new())),
            auth_error: Arc::new(RwLock::new(None)),
            next_error: Arc::new(RwLock::new(None)),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register a collection and the releases it resolves to.
    pub async fn add_collection(&self, collection_id: &str, releases: Vec<Release>) {
        self.collections
            .write()
            .await
            .insert(collection_id.to_string(), releases);
    }

    /// Register a popularity value for an album.
    pub async fn set_popularity(&self, album_id: &str, popularity: u8) {
        self.popularity
            .write()
            .await
            .insert(album_id.to_string(), popularity);
    }

    /// Make a collection fail persistently with the given message.
    pub async fn fail_collection(&self, collection_id: &str, message: &str) {
        self.failing_collections
            .write()
            .await
            .insert(collection_id.to_string(), message.to_string());
    }

    /// Make an album's popularity lookup fail persistently with the given
    /// HTTP status.
    pub async fn fail_album(&self, album_id: &str, status: u16) {
        self.failing_albums
            .write()
            .await
            .insert(album_id.to_string(), status);
    }

    /// Make the token exchange fail.
    pub async fn set_auth_error(&self, message: &str) {
        *self.auth_error.write().await = Some(message.to_string());
    }

    /// Configure the next operation (any kind) to fail with the given error.
    pub async fn set_next_error(&self, error: ProviderError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedCatalogCall> {
        self.calls.read().await.clone()
    }

    /// Get the number of calls performed.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    async fn take_error(&self) -> Option<ProviderError> {
        self.next_error.write().await.take()
    }

    async fn record(&self, call: RecordedCatalogCall) {
        self.calls.write().await.push(call);
    }
}

#[async_trait]
impl ReleaseCatalog for MockReleaseCatalog {
    async fn authenticate(&self) -> Result<(), ProviderError> {
        self.record(RecordedCatalogCall::Authenticate).await;

        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        if let Some(message) = self.auth_error.read().await.clone() {
            return Err(ProviderError::AuthFailed(message));
        }
        Ok(())
    }

    async fn collection_releases(
        &self,
        collection_id: &str,
    ) -> Result<Vec<Release>, ProviderError> {
        self.record(RecordedCatalogCall::CollectionReleases {
            collection_id: collection_id.to_string(),
        })
        .await;

        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        if let Some(message) = self.failing_collections.read().await.get(collection_id) {
            return Err(ProviderError::ApiError {
                status: 500,
                message: message.clone(),
            });
        }

        self.collections
            .read()
            .await
            .get(collection_id)
            .cloned()
            .ok_or_else(|| ProviderError::ApiError {
                status: 404,
                message: format!("collection {} not found", collection_id),
            })
    }

    async fn album_popularity(&self, album_id: &str) -> Result<Option<u8>, ProviderError> {
        self.record(RecordedCatalogCall::AlbumPopularity {
            album_id: album_id.to_string(),
        })
        .await;

        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        if let Some(status) = self.failing_albums.read().await.get(album_id) {
            return Err(ProviderError::ApiError {
                status: *status,
                message: "injected failure".to_string(),
            });
        }

        Ok(self.popularity.read().await.get(album_id).copied())
    }
}
