//! The aggregation-enrichment-scoring pipeline.
//!
//! Stages run strictly in sequence: collect (fan-out per collection), merge,
//! year filter, popularity enrichment, community-stats enrichment, then
//! batch-wide scoring. Only the auth step can abort a run; every other
//! failure degrades the affected collection or release and is surfaced in
//! the run report.

mod enrich;
mod merge;
mod runner;
mod score;
mod types;

pub use enrich::{enrich_community_stats, enrich_popularity, RetryPolicy};
pub use merge::{filter_by_year, merge_collections};
pub use runner::{Pipeline, PipelineOptions};
pub use score::{days_since_release, score_batch};
pub use types::{PipelineError, PipelineReport};
