pub mod config;
pub mod pipeline;
pub mod providers;
pub mod release;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LastfmConfig,
    PipelineConfig, RateLimitConfig, SanitizedConfig, ScoreWeights, SpotifyConfig,
};
pub use pipeline::{
    days_since_release, enrich_community_stats, enrich_popularity, filter_by_year,
    merge_collections, score_batch, Pipeline, PipelineError, PipelineOptions, PipelineReport,
    RetryPolicy,
};
pub use providers::{
    AlbumStats, LastfmClient, Pacer, ProviderError, ReleaseCatalog, SpotifyClient, StatsSource,
};
pub use release::{
    filter_by_release_type, parse_release_date, sort_releases, Release, SortKey,
};
