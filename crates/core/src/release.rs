//! The release entity flowing through the aggregation pipeline.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An album-level catalog entry with its enrichment and scoring fields.
///
/// Created by the collector, filtered by year, enriched in place by the two
/// providers and finally annotated by the scorer. Enrichment fields stay
/// `None` when the corresponding lookup failed; derived fields stay `None`
/// until the scorer has run over the whole batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Release {
    /// Stable catalog identifier, unique within a run.
    pub id: String,
    /// Album title.
    pub name: String,
    /// Artist names in source order; the first entry is the primary artist.
    pub artists: Vec<String>,
    /// Date string as reported by the catalog: full date ("2025-06-15"),
    /// year-month ("2025-06") or year only ("2025"). Never validated beyond
    /// format matching at consumption time.
    pub release_date: String,
    /// Track count, at least 1.
    pub total_tracks: u32,
    /// Canonical link to the release.
    pub external_url: String,
    /// Cover image, if the catalog provided one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Category string ("album", "single", ...); unknown values pass through.
    pub release_type: String,
    /// Catalog popularity, 0-100. Absent if enrichment failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u8>,
    /// Community listener count. Absent if enrichment failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_listeners: Option<u64>,
    /// Community play count. Absent if enrichment failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_playcount: Option<u64>,
    /// Age in days at scoring time, at least 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_since_release: Option<i64>,
    /// Listeners divided by age in days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listeners_per_day: Option<f64>,
    /// Play count divided by age in days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playcount_per_day: Option<f64>,
    /// Weighted 0-100 score, two-decimal precision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite_score: Option<f64>,
}

impl Release {
    /// The first credited artist, used for community-metrics lookups.
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(|s| s.as_str())
    }

    /// Parse the release date, trying full date, year-month and year-only
    /// forms in that order. Returns `None` when none of them match.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_release_date(&self.release_date)
    }
}

/// Parse a catalog date string in one of the three accepted forms.
///
/// Partial dates resolve to the first day of the missing components, so
/// "2025-06" parses as June 1st and "2025" as January 1st.
pub fn parse_release_date(date: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{}-01", date), "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{}-01-01", date), "%Y-%m-%d") {
        return Some(d);
    }
    None
}

/// Orderings the presentation layer can ask for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Composite score, highest first. Unscored releases sort last.
    Score,
    /// Release date, newest first. Unparseable dates sort last.
    DateNewest,
    /// Release date, oldest first. Unparseable dates sort first.
    DateOldest,
    /// Album name, case-insensitive.
    Name,
}

/// Sort a batch in place by the given key. Ties keep their relative order.
pub fn sort_releases(releases: &mut [Release], key: SortKey) {
    match key {
        SortKey::Score => releases.sort_by(|a, b| {
            let a = a.composite_score.unwrap_or(f64::NEG_INFINITY);
            let b = b.composite_score.unwrap_or(f64::NEG_INFINITY);
            b.partial_cmp(&a).unwrap_or(Ordering::Equal)
        }),
        SortKey::DateNewest => {
            releases.sort_by_key(|r| std::cmp::Reverse(r.parsed_date().unwrap_or(NaiveDate::MIN)))
        }
        SortKey::DateOldest => {
            releases.sort_by_key(|r| r.parsed_date().unwrap_or(NaiveDate::MIN))
        }
        SortKey::Name => releases.sort_by_key(|r| r.name.to_lowercase()),
    }
}

/// Keep only releases of the given category.
pub fn filter_by_release_type(releases: Vec<Release>, release_type: &str) -> Vec<Release> {
    releases
        .into_iter()
        .filter(|r| r.release_type == release_type)
        .collect()
}
