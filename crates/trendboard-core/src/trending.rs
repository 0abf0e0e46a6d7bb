// Trend calculation - diff two snapshots and rank by star gain
use crate::models::{Repository, Trend, TrendPeriod};
use std::collections::HashMap;

/// Diff `current` against `baseline` by identity and rank the result.
///
/// A repository missing from the baseline counts as 0 stars back then, so its
/// diff is its whole star count. Duplicate identities in the baseline: the
/// last one wins. Ranking is by diff, descending; the sort is stable so ties
/// keep their order from `current`.
pub fn compute_trends(
    current: &[Repository],
    baseline: &[Repository],
    period: TrendPeriod,
) -> Vec<Trend> {
    let past: HashMap<&str, u64> = baseline
        .iter()
        .map(|repo| (repo.full_name(), repo.stars()))
        .collect();

    let mut trends: Vec<Trend> = current
        .iter()
        .map(|repo| {
            let before = past.get(repo.full_name()).copied().unwrap_or(0);
            Trend::new(repo.clone(), star_diff(repo.stars(), before), period)
        })
        .collect();

    rank_trends(&mut trends);
    trends
}

/// Sort by diff, biggest gain first. `sort_by` is stable.
pub fn rank_trends(trends: &mut [Trend]) {
    trends.sort_by(|a, b| b.diff().cmp(&a.diff()));
}

fn star_diff(now: u64, before: u64) -> i64 {
    let now = i64::try_from(now).unwrap_or(i64::MAX);
    let before = i64::try_from(before).unwrap_or(i64::MAX);
    now.saturating_sub(before)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, stars: i64) -> Repository {
        Repository::new(name, stars).unwrap()
    }

    fn names(trends: &[Trend]) -> Vec<&str> {
        trends.iter().map(|t| t.repository().full_name()).collect()
    }

    #[test]
    fn test_ranks_by_diff_descending() {
        let current = vec![
            repo("owner/repo-c", 110),
            repo("owner/repo-a", 350),
            repo("owner/repo-b", 195),
            repo("owner/repo-d", 525),
        ];
        let baseline = vec![
            repo("owner/repo-a", 300),
            repo("owner/repo-b", 200),
            repo("owner/repo-c", 100),
            repo("owner/repo-d", 500),
        ];

        let trends = compute_trends(&current, &baseline, TrendPeriod::Daily);

        assert_eq!(
            names(&trends),
            vec!["owner/repo-a", "owner/repo-d", "owner/repo-c", "owner/repo-b"]
        );
        let diffs: Vec<i64> = trends.iter().map(Trend::diff).collect();
        assert_eq!(diffs, vec![50, 25, 10, -5]);
        assert!(trends.iter().all(|t| t.period() == TrendPeriod::Daily));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let current = vec![repo("x/a", 10), repo("x/b", 10), repo("x/c", 3)];
        let baseline = vec![repo("x/a", 5), repo("x/b", 5)];

        let trends = compute_trends(&current, &baseline, TrendPeriod::Weekly);
        assert_eq!(names(&trends), vec!["x/a", "x/b", "x/c"]);

        // flip the input, the tie flips with it
        let current = vec![repo("x/b", 10), repo("x/a", 10), repo("x/c", 3)];
        let trends = compute_trends(&current, &baseline, TrendPeriod::Weekly);
        assert_eq!(names(&trends), vec!["x/b", "x/a", "x/c"]);
    }

    #[test]
    fn test_missing_baseline_counts_as_zero() {
        let trends = compute_trends(&[repo("x/new", 42)], &[], TrendPeriod::Weekly);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].diff(), 42);
        assert_eq!(trends[0].repository().stars(), 42);
    }

    #[test]
    fn test_baseline_duplicates_last_write_wins() {
        let baseline = vec![repo("x/a", 1), repo("x/a", 90)];
        let trends = compute_trends(&[repo("x/a", 100)], &baseline, TrendPeriod::Daily);
        assert_eq!(trends[0].diff(), 10);
    }

    #[test]
    fn test_baseline_only_entries_are_ignored() {
        let baseline = vec![repo("x/gone", 1000), repo("x/a", 5)];
        let trends = compute_trends(&[repo("x/a", 6)], &baseline, TrendPeriod::Monthly);
        assert_eq!(names(&trends), vec!["x/a"]);
    }

    #[test]
    fn test_weekly_gain_ranked_first() {
        let baseline = vec![repo("o/r1", 100), repo("o/r2", 200)];
        let current = vec![repo("o/r2", 210), repo("o/r1", 180)];

        let trends = compute_trends(&current, &baseline, TrendPeriod::Weekly);
        assert_eq!(names(&trends), vec!["o/r1", "o/r2"]);
        assert_eq!(trends[0].diff(), 80);
        assert_eq!(trends[1].diff(), 10);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let current = vec![repo("a/a", 5), repo("b/b", 9), repo("c/c", 5), repo("d/d", 1)];
        let baseline = vec![repo("b/b", 4)];

        let first = compute_trends(&current, &baseline, TrendPeriod::Weekly);
        let second = compute_trends(&current, &baseline, TrendPeriod::Weekly);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_current() {
        assert!(compute_trends(&[], &[repo("a/a", 1)], TrendPeriod::Daily).is_empty());
    }
}
