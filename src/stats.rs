//! The aggregation core: pure reductions from a materialized commit list
//! to summary statistics. Both functions take the commits most-recent-first
//! (the order the commit source yields) and never fail; malformed commits
//! are rejected by the source before they get here.

use chrono::{Datelike, Timelike};

use crate::model::{BasicStats, CommitRecord, DateRange, FrequencyStats};
use crate::util::{day_key, month_key};

/// Total commit count, per-author counts in first-seen order, and the
/// earliest/latest commit timestamps. Empty input yields zero commits,
/// no authors, and no date range.
pub fn compute_basic_stats(commits: &[CommitRecord]) -> BasicStats {
    let mut stats = BasicStats {
        total_commits: commits.len() as u64,
        ..BasicStats::default()
    };

    for commit in commits {
        stats.authors.increment(&commit.author_name);
    }

    let first = commits.iter().map(|c| c.timestamp).min();
    let last = commits.iter().map(|c| c.timestamp).max();
    if let (Some(first_commit), Some(last_commit)) = (first, last) {
        stats.date_range = Some(DateRange {
            first_commit,
            last_commit,
        });
    }

    stats
}

/// Commit counts bucketed by hour of day, calendar date, month, and
/// weekday. Every commit contributes exactly one increment to each of the
/// four mappings, using its committed offset verbatim. Empty input yields
/// four empty mappings.
pub fn compute_frequency_stats(commits: &[CommitRecord]) -> FrequencyStats {
    let mut stats = FrequencyStats::default();

    for commit in commits {
        let ts = &commit.timestamp;
        *stats.hourly_distribution.entry(ts.hour()).or_insert(0) += 1;
        *stats.daily_commits.entry(day_key(ts)).or_insert(0) += 1;
        *stats.monthly_commits.entry(month_key(ts)).or_insert(0) += 1;
        stats.weekday_distribution.increment(ts.weekday());
    }

    stats
}
