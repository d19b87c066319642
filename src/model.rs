use chrono::{DateTime, FixedOffset, Weekday};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Weekday display names, Monday first, matching git log conventions.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A single commit as materialized by the commit source.
///
/// The timestamp keeps the offset recorded in the commit itself; all
/// derived buckets (hour, date, month, weekday) are computed in that
/// offset so results are reproducible from the same history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Abbreviated commit hash.
    pub id: String,
    pub author_name: String,
    pub author_email: String,
    pub timestamp: DateTime<FixedOffset>,
    /// Commit subject line.
    pub message: String,
    pub files_changed: u32,
    pub insertions: u32,
    pub deletions: u32,
}

/// Earliest and latest commit timestamps in the analyzed history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub first_commit: DateTime<FixedOffset>,
    pub last_commit: DateTime<FixedOffset>,
}

/// Commit totals per author and overall date range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicStats {
    pub total_commits: u64,
    pub authors: AuthorCounts,
    /// `None` when the history is empty.
    pub date_range: Option<DateRange>,
}

/// Commit counts bucketed by hour of day, calendar date, month, and weekday.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyStats {
    /// Hour of day (0-23) to commit count.
    pub hourly_distribution: BTreeMap<u32, u64>,
    /// ISO 8601 date ("YYYY-MM-DD") to commit count.
    pub daily_commits: BTreeMap<String, u64>,
    /// "YYYY-MM" to commit count.
    pub monthly_commits: BTreeMap<String, u64>,
    pub weekday_distribution: WeekdayCounts,
}

/// The full JSON payload of the `stats` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsReport {
    #[serde(flatten)]
    pub basic: BasicStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_analysis: Option<FrequencyStats>,
}

/// Per-author commit counts, preserving first-seen order.
///
/// Serializes as a JSON map whose key order is the order authors were
/// first encountered during traversal, which is what the text output
/// prints. Author sets are small, so lookups scan linearly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorCounts {
    entries: Vec<(String, u64)>,
}

impl AuthorCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, name: &str) {
        match self.entries.iter_mut().find(|(author, _)| author == name) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((name.to_string(), 1)),
        }
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(author, _)| author == name)
            .map(|(_, count)| *count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Authors in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(author, count)| (author.as_str(), *count))
    }

    /// Authors ordered by commit count, highest first. Ties keep
    /// first-seen order.
    pub fn sorted_by_count(&self) -> Vec<(&str, u64)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }
}

impl Serialize for AuthorCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (author, count) in &self.entries {
            map.serialize_entry(author, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AuthorCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AuthorCountsVisitor;

        impl<'de> Visitor<'de> for AuthorCountsVisitor {
            type Value = AuthorCounts;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of author name to commit count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((author, count)) = access.next_entry::<String, u64>()? {
                    entries.push((author, count));
                }
                Ok(AuthorCounts { entries })
            }
        }

        deserializer.deserialize_map(AuthorCountsVisitor)
    }
}

/// Commit counts per weekday, stored Monday..Sunday.
///
/// Zero-count days are omitted from serialization so an empty history
/// serializes as `{}`, while chart rendering can still iterate all seven
/// days via [`iter_all`](Self::iter_all).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeekdayCounts {
    counts: [u64; 7],
}

impl WeekdayCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, weekday: Weekday) {
        self.counts[weekday.num_days_from_monday() as usize] += 1;
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        WEEKDAY_NAMES
            .iter()
            .position(|&day| day == name)
            .map(|idx| self.counts[idx])
            .filter(|&count| count > 0)
    }

    /// Days with at least one commit, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.iter_all().filter(|&(_, count)| count > 0)
    }

    /// All seven days, Monday first, including zero-count days.
    pub fn iter_all(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        WEEKDAY_NAMES
            .iter()
            .zip(self.counts.iter())
            .map(|(&day, &count)| (day, count))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&count| count == 0)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

impl Serialize for WeekdayCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let present = self.counts.iter().filter(|&&count| count > 0).count();
        let mut map = serializer.serialize_map(Some(present))?;
        for (day, count) in self.iter() {
            map.serialize_entry(day, &count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for WeekdayCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WeekdayCountsVisitor;

        impl<'de> Visitor<'de> for WeekdayCountsVisitor {
            type Value = WeekdayCounts;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of weekday name to commit count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut counts = [0u64; 7];
                while let Some((day, count)) = access.next_entry::<String, u64>()? {
                    let idx = WEEKDAY_NAMES
                        .iter()
                        .position(|&name| name == day)
                        .ok_or_else(|| serde::de::Error::unknown_field(&day, &WEEKDAY_NAMES))?;
                    counts[idx] = count;
                }
                Ok(WeekdayCounts { counts })
            }
        }

        deserializer.deserialize_map(WeekdayCountsVisitor)
    }
}
