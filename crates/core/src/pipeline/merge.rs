//! Merging and year filtering of collected release lists.

use std::collections::HashSet;

use crate::release::Release;

/// Merge per-collection release lists into one batch keyed by release id.
///
/// First occurrence wins; later duplicates are dropped. Input order
/// (collection order, then page order within a collection) is preserved, so
/// the merge is deterministic regardless of fetch completion order.
pub fn merge_collections(collections: Vec<Vec<Release>>) -> Vec<Release> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for releases in collections {
        for release in releases {
            if seen.insert(release.id.clone()) {
                merged.push(release);
            }
        }
    }

    merged
}

/// Keep releases whose date string starts with the target year.
///
/// This is a string-prefix test, not a calendar comparison: the date must be
/// exactly the year, or the year followed by `-`. Partial dates ("2025",
/// "2025-03") pass, and so does a malformed remainder after the dash.
pub fn filter_by_year(releases: Vec<Release>, year: &str) -> Vec<Release> {
    releases
        .into_iter()
        .filter(|r| matches_year(&r.release_date, year))
        .collect()
}

fn matches_year(date: &str, year: &str) -> bool {
    match date.strip_prefix(year) {
        Some(rest) => rest.is_empty() || rest.starts_with('-'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn ids(releases: &[Release]) -> Vec<&str> {
        releases.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_merge_first_occurrence_wins() {
        let first = vec![
            fixtures::release("a", "Album A", "Artist", "2025-01-01"),
            fixtures::release("b", "Album B", "Artist", "2025-02-01"),
        ];
        let mut duplicate = fixtures::release("a", "Album A (other listing)", "Artist", "2025-01-01");
        duplicate.total_tracks = 99;
        let second = vec![duplicate, fixtures::release("c", "Album C", "Artist", "2025-03-01")];

        let merged = merge_collections(vec![first, second]);
        assert_eq!(ids(&merged), vec!["a", "b", "c"]);
        assert_eq!(merged[0].name, "Album A");
        assert_eq!(merged[0].total_tracks, 10);
    }

    #[test]
    fn test_merge_idempotent() {
        let collection = vec![
            fixtures::release("a", "A", "Artist", "2025"),
            fixtures::release("b", "B", "Artist", "2025"),
        ];

        let once = merge_collections(vec![collection.clone()]);
        let twice = merge_collections(vec![collection.clone(), collection]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_collections(vec![]).is_empty());
        assert!(merge_collections(vec![vec![], vec![]]).is_empty());
    }

    #[test]
    fn test_year_filter_accepts_all_date_forms() {
        for date in ["2025", "2025-06", "2025-06-15"] {
            assert!(matches_year(date, "2025"), "{} should match", date);
        }
    }

    #[test]
    fn test_year_filter_rejects_other_years_and_run_ons() {
        for date in ["2024-12", "20256", "2026", ""] {
            assert!(!matches_year(date, "2025"), "{} should not match", date);
        }
    }

    #[test]
    fn test_year_filter_is_not_a_date_parse() {
        // Prefix semantics, by design: a malformed remainder still passes
        assert!(matches_year("2025-not-a-month", "2025"));
    }

    #[test]
    fn test_filter_by_year_drops_non_matching() {
        let releases = vec![
            fixtures::release("a", "A", "Artist", "2025-06-15"),
            fixtures::release("b", "B", "Artist", "2024-12"),
            fixtures::release("c", "C", "Artist", "2025"),
            fixtures::release("d", "D", "Artist", "20256"),
        ];

        let filtered = filter_by_year(releases, "2025");
        assert_eq!(ids(&filtered), vec!["a", "c"]);
    }
}
