//! Types for pipeline runs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::providers::ProviderError;
use crate::release::Release;

/// Errors that abort a pipeline run.
///
/// Everything recoverable (a failing collection, a failing lookup) is
/// reported through [`PipelineReport`] instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("authentication failed: {0}")]
    Auth(#[source] ProviderError),
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    /// The scored batch, in collection order then page order.
    pub releases: Vec<Release>,
    /// Collections that contributed nothing (collection id -> error).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub source_errors: HashMap<String, String>,
    /// Releases whose popularity lookup failed after retries.
    #[serde(default)]
    pub popularity_failures: u32,
    /// Releases whose community-stats lookup failed after retries.
    #[serde(default)]
    pub stats_failures: u32,
    /// How long the run took in milliseconds.
    pub duration_ms: u64,
}
