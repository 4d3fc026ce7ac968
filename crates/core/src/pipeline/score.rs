//! Composite scoring over the enriched batch.

use chrono::NaiveDate;

use crate::config::ScoreWeights;
use crate::release::{parse_release_date, Release};

/// Age of a release in days, never less than 1.
///
/// Tries the three accepted date forms in order; an unparseable date falls
/// back to 1, as does a release dated today or in the future. The fallback
/// keeps unparseable releases scoreable at the cost of inflating their
/// per-day rates.
pub fn days_since_release(release_date: &str, today: NaiveDate) -> i64 {
    match parse_release_date(release_date) {
        Some(date) => (today - date).num_days().max(1),
        None => 1,
    }
}

/// Min-max rescale into [0, 1]. A degenerate range maps to 0.
fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max > min {
        (value - min) / (max - min)
    } else {
        0.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn batch_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    (min, max)
}

/// Annotate the whole batch with ages, per-day rates and composite scores.
///
/// Normalization is batch-wide: a release's score depends on the
/// distribution of the whole result set at scoring time, so this must run
/// once, after every enrichment call has completed. Absent inputs contribute
/// a normalized value of 0 rather than excluding the release. The final
/// score is clamped into [0, 100] and rounded to two decimals.
pub fn score_batch(releases: &mut [Release], today: NaiveDate, weights: &ScoreWeights) {
    for release in releases.iter_mut() {
        let days = days_since_release(&release.release_date, today);
        release.days_since_release = Some(days);
        release.listeners_per_day = release
            .community_listeners
            .map(|listeners| listeners as f64 / days as f64);
        release.playcount_per_day = release
            .community_playcount
            .map(|playcount| playcount as f64 / days as f64);
    }

    let (min_listeners, max_listeners) =
        batch_range(releases.iter().filter_map(|r| r.listeners_per_day));
    let (min_playcount, max_playcount) =
        batch_range(releases.iter().filter_map(|r| r.playcount_per_day));

    for release in releases.iter_mut() {
        let popularity_norm = release
            .popularity
            .map(|p| p as f64 / 100.0)
            .unwrap_or(0.0);
        let listeners_norm = release
            .listeners_per_day
            .map(|v| normalize(v, min_listeners, max_listeners))
            .unwrap_or(0.0);
        let playcount_norm = release
            .playcount_per_day
            .map(|v| normalize(v, min_playcount, max_playcount))
            .unwrap_or(0.0);

        let blended = weights.popularity * popularity_norm
            + weights.listeners * listeners_norm
            + weights.playcount * playcount_norm;

        release.composite_score = Some(round2((100.0 * blended).clamp(0.0, 100.0)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::Release;
    use crate::testing::fixtures;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 11).unwrap()
    }

    #[test]
    fn test_days_since_release_full_date() {
        assert_eq!(days_since_release("2025-01-01", today()), 10);
    }

    #[test]
    fn test_days_since_release_partial_dates() {
        assert_eq!(days_since_release("2025-01", today()), 10);
        // "2024" resolves to January 1st 2024
        assert_eq!(days_since_release("2024", today()), 376);
    }

    #[test]
    fn test_days_since_release_fallback() {
        assert_eq!(days_since_release("unparseable", today()), 1);
        assert_eq!(days_since_release("", today()), 1);
    }

    #[test]
    fn test_days_since_release_clamps_future_dates() {
        assert_eq!(days_since_release("2025-06-15", today()), 1);
        assert_eq!(days_since_release("2025-01-11", today()), 1);
    }

    #[test]
    fn test_normalize_degenerate_range() {
        assert_eq!(normalize(5.0, 5.0, 5.0), 0.0);
        assert_eq!(normalize(0.0, 3.0, 3.0), 0.0);
    }

    #[test]
    fn test_missing_metric_fallback() {
        // popularity 72, no community metrics: round(100 * 0.5 * 0.72) = 36.0
        let mut batch = vec![fixtures::release("a", "A", "Artist", "2025-01-01")];
        batch[0].popularity = Some(72);

        score_batch(&mut batch, today(), &ScoreWeights::default());
        assert_eq!(batch[0].composite_score, Some(36.0));
        assert_eq!(batch[0].days_since_release, Some(10));
        assert!(batch[0].listeners_per_day.is_none());
    }

    #[test]
    fn test_two_release_scenario() {
        // Ten days old, so per-day rates are counts / 10
        let mut a = fixtures::release("a", "A", "Artist", "2025-01-01");
        a.popularity = Some(80);
        a.community_listeners = Some(500); // 50/day (batch max)
        a.community_playcount = Some(2000); // 200/day (batch max)

        let mut b = fixtures::release("b", "B", "Artist", "2025-01-01");
        b.popularity = Some(40);
        b.community_listeners = Some(100); // 10/day (batch min)
        b.community_playcount = Some(1000); // 100/day (batch min)

        let mut batch = vec![a, b];
        score_batch(&mut batch, today(), &ScoreWeights::default());

        assert_eq!(batch[0].listeners_per_day, Some(50.0));
        assert_eq!(batch[0].playcount_per_day, Some(200.0));
        // A: 100 * (0.5*0.8 + 0.3*1.0 + 0.2*1.0) = 90.0
        assert_eq!(batch[0].composite_score, Some(90.0));
        // B: 100 * (0.5*0.4 + 0.3*0.0 + 0.2*0.0) = 20.0
        assert_eq!(batch[1].composite_score, Some(20.0));
    }

    #[test]
    fn test_identical_rates_normalize_to_zero() {
        let mut batch: Vec<_> = (0..3)
            .map(|i| {
                let mut r =
                    fixtures::release(&format!("r{}", i), "Album", "Artist", "2025-01-01");
                r.community_listeners = Some(100);
                r.popularity = Some(50);
                r
            })
            .collect();

        score_batch(&mut batch, today(), &ScoreWeights::default());

        for release in &batch {
            assert_eq!(release.listeners_per_day, Some(10.0));
            // Degenerate listeners range contributes 0: score is popularity only
            assert_eq!(release.composite_score, Some(25.0));
        }
    }

    #[test]
    fn test_scores_stay_bounded() {
        let mut batch = vec![
            fixtures::enriched_release("a", "A", "Artist", "2025-01-01", 100, 1_000_000, 50_000_000),
            fixtures::release("b", "B", "Artist", "garbled"),
            fixtures::release("c", "C", "Artist", "2024-06"),
        ];
        batch[1].community_listeners = Some(3);
        batch[2].popularity = Some(0);

        score_batch(&mut batch, today(), &ScoreWeights::default());

        for release in &batch {
            let score = release.composite_score.unwrap();
            assert!((0.0..=100.0).contains(&score), "score {} out of range", score);
            assert!(release.days_since_release.unwrap() >= 1);
        }
    }

    #[test]
    fn test_empty_batch_is_fine() {
        let mut batch: Vec<Release> = vec![];
        score_batch(&mut batch, today(), &ScoreWeights::default());
    }
}
