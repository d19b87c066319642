use crate::error::{GitpulseError, Result};
use crate::model::CommitRecord;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use gix::object::tree::diff::ChangeDetached;
use gix::{discover, ObjectId, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Inclusive time window restricting which commits are collected.
#[derive(Debug, Clone, Default)]
pub struct TimeWindow {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn contains(&self, timestamp: &DateTime<FixedOffset>) -> bool {
        let instant = timestamp.with_timezone(&Utc);
        if let Some(since) = self.since {
            if instant < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if instant > until {
                return false;
            }
        }
        true
    }
}

/// What to collect and what to skip during history traversal.
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    pub window: TimeWindow,
    pub include_merges: bool,
    /// Keep only the newest N commits after filtering.
    pub max_commits: Option<usize>,
    pub exclude_authors: Vec<String>,
    pub include_only_authors: Vec<String>,
}

impl CollectOptions {
    fn author_allowed(&self, author: &str) -> bool {
        if self.exclude_authors.iter().any(|name| name == author) {
            return false;
        }
        if self.include_only_authors.is_empty() {
            return true;
        }
        self.include_only_authors.iter().any(|name| name == author)
    }
}

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at `path`, or current dir if `None`
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let repo_path = path
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or(std::env::current_dir()?);

        let repo = discover(&repo_path).map_err(|e| {
            GitpulseError::InvalidRepository(format!("{}: {e}", repo_path.display()))
        })?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn resolve_window(&self, since: Option<&str>, until: Option<&str>) -> Result<TimeWindow> {
        let since_dt = since.map(|s| self.parse_commit_or_date(s)).transpose()?;
        let until_dt = until.map(|u| self.parse_commit_or_date(u)).transpose()?;

        if let (Some(s), Some(u)) = (since_dt, until_dt) {
            if s > u {
                return Err(GitpulseError::InvalidDate(format!(
                    "Invalid range: since ({}) is after until ({})",
                    s, u
                )));
            }
        }

        Ok(TimeWindow {
            since: since_dt,
            until: until_dt,
        })
    }

    fn parse_commit_or_date(&self, input: &str) -> Result<DateTime<Utc>> {
        // RFC3339
        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(dt.with_timezone(&Utc));
        }

        // YYYY-MM-DD
        if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            if let Some(datetime) = date.and_hms_opt(0, 0, 0) {
                return Ok(Utc.from_utc_datetime(&datetime));
            }
        }

        // Relative duration (e.g., "2 weeks ago")
        if let Some(duration) = parse_natural_duration(input) {
            let now = SystemTime::now();
            let target = now.checked_sub(duration).ok_or_else(|| {
                GitpulseError::InvalidDate(format!("Duration overflow for '{input}'"))
            })?;
            return Ok(DateTime::<Utc>::from(target));
        }

        // Fallback to Git ref
        let id = self
            .repo
            .rev_parse_single(input)
            .map_err(|e| GitpulseError::Parse(format!("Invalid commit or date '{input}': {e}")))?;

        let commit = id
            .object()?
            .try_into_commit()
            .map_err(|_| GitpulseError::Parse(format!("Not a commit: {input}")))?;

        let secs = commit.time()?.seconds;
        DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| GitpulseError::InvalidDate(format!("Invalid timestamp: {secs}")))
    }

    /// Walk history from HEAD and materialize every matching commit,
    /// most-recent-first. An unborn HEAD (fresh `git init`) yields an
    /// empty vector.
    pub fn collect_commits(&self, options: &CollectOptions) -> Result<Vec<CommitRecord>> {
        let mut head = self.repo.head()?;
        if head.is_unborn() {
            return Ok(Vec::new());
        }
        let head_commit = head.peel_to_commit_in_place()?;

        let mut commits = Vec::new();
        let mut seen: HashSet<ObjectId> = HashSet::new();
        let mut stack: VecDeque<ObjectId> = VecDeque::from([head_commit.id]);

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Collecting commits...");

        while let Some(commit_id) = stack.pop_back() {
            if !seen.insert(commit_id) {
                continue;
            }

            let commit = self.repo.find_commit(commit_id)?;
            let parents: Vec<ObjectId> = commit.parent_ids().map(|id| id.into()).collect();
            for pid in &parents {
                stack.push_back(*pid);
            }

            let timestamp = commit_timestamp(&commit, commit_id)?;

            if !options.window.contains(&timestamp) {
                continue;
            }
            if !options.include_merges && parents.len() > 1 {
                pb.inc(1);
                continue;
            }

            let author = commit.author()?;
            let author_name = author.name.to_string();
            if !options.author_allowed(&author_name) {
                pb.inc(1);
                continue;
            }

            let message = commit.message()?.title.to_string().trim().to_string();
            let (files_changed, insertions, deletions) =
                self.diff_totals(commit_id, parents.first().copied())?;

            commits.push(CommitRecord {
                id: short_id(&commit_id),
                author_name,
                author_email: author.email.to_string(),
                timestamp,
                message,
                files_changed,
                insertions,
                deletions,
            });

            pb.inc(1);
        }

        pb.finish_and_clear();

        // Traversal order is parent-chasing, not chronological; callers
        // expect most-recent-first. Stable sort keeps equal timestamps in
        // traversal order so reruns are repeatable.
        commits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(cap) = options.max_commits {
            commits.truncate(cap);
        }

        Ok(commits)
    }

    /// Diff a commit against its first parent (or the empty tree for a
    /// root commit) and reduce the changes to file/line totals.
    fn diff_totals(
        &self,
        commit_id: ObjectId,
        parent_id: Option<ObjectId>,
    ) -> Result<(u32, u32, u32)> {
        let commit_tree = self.repo.find_commit(commit_id)?.tree()?;
        let changes: Vec<ChangeDetached> = match parent_id {
            Some(parent) => {
                let parent_tree = self.repo.find_commit(parent)?.tree()?;
                self.repo
                    .diff_tree_to_tree(Some(&parent_tree), Some(&commit_tree), None)?
            }
            None => self.repo.diff_tree_to_tree(None, Some(&commit_tree), None)?,
        };

        let mut files_changed = 0u32;
        let mut insertions = 0u32;
        let mut deletions = 0u32;

        for change in changes {
            match change {
                ChangeDetached::Addition { id, .. } => {
                    if let Ok(obj) = self.repo.find_object(id) {
                        files_changed += 1;
                        if !is_binary_object(&obj) {
                            insertions += count_lines(&obj);
                        }
                    }
                }
                ChangeDetached::Deletion { id, .. } => {
                    if let Ok(obj) = self.repo.find_object(id) {
                        files_changed += 1;
                        if !is_binary_object(&obj) {
                            deletions += count_lines(&obj);
                        }
                    }
                }
                ChangeDetached::Modification {
                    previous_id, id, ..
                } => {
                    if let (Ok(old_obj), Ok(new_obj)) =
                        (self.repo.find_object(previous_id), self.repo.find_object(id))
                    {
                        files_changed += 1;
                        if !is_binary_object(&old_obj) && !is_binary_object(&new_obj) {
                            let (added, deleted) = compute_line_diff(&old_obj, &new_obj);
                            insertions += added;
                            deletions += deleted;
                        }
                    }
                }
                ChangeDetached::Rewrite {
                    source_id, id, copy, ..
                } => {
                    if let (Ok(old_obj), Ok(new_obj)) =
                        (self.repo.find_object(source_id), self.repo.find_object(id))
                    {
                        files_changed += 1;
                        if !is_binary_object(&old_obj) && !is_binary_object(&new_obj) {
                            let (added, deleted) = compute_line_diff(&old_obj, &new_obj);
                            insertions += added;
                            if !copy {
                                deletions += deleted;
                            }
                        }
                    }
                }
            }
        }

        Ok((files_changed, insertions, deletions))
    }
}

/// The commit's timestamp in the offset it was committed with. A commit
/// the library can read but whose time fields are out of range violates
/// the source contract and is fatal.
fn commit_timestamp(
    commit: &gix::Commit<'_>,
    commit_id: ObjectId,
) -> Result<DateTime<FixedOffset>> {
    let time = commit.time()?;
    let offset = FixedOffset::east_opt(time.offset).ok_or_else(|| {
        GitpulseError::MalformedCommit {
            id: short_id(&commit_id),
            reason: format!("timezone offset {} out of range", time.offset),
        }
    })?;
    offset
        .timestamp_opt(time.seconds, 0)
        .single()
        .ok_or_else(|| GitpulseError::MalformedCommit {
            id: short_id(&commit_id),
            reason: format!("timestamp {} out of range", time.seconds),
        })
}

fn short_id(id: &ObjectId) -> String {
    let hex = id.to_string();
    hex[..hex.len().min(8)].to_string()
}

fn is_binary_object(object: &gix::Object) -> bool {
    object.data.as_slice().iter().take(8192).any(|&b| b == 0)
}

fn count_lines(object: &gix::Object) -> u32 {
    std::str::from_utf8(object.data.as_slice())
        .map(|t| t.lines().count() as u32)
        .unwrap_or(0)
}

fn compute_line_diff(old_object: &gix::Object, new_object: &gix::Object) -> (u32, u32) {
    let old_text = std::str::from_utf8(old_object.data.as_slice()).unwrap_or("");
    let new_text = std::str::from_utf8(new_object.data.as_slice()).unwrap_or("");

    let old_lines: Vec<&str> = old_text.lines().collect();
    let new_lines: Vec<&str> = new_text.lines().collect();

    let mut added = 0usize;
    let mut deleted = 0usize;
    let (mut oi, mut ni) = (0usize, 0usize);

    while oi < old_lines.len() || ni < new_lines.len() {
        if oi >= old_lines.len() {
            added += new_lines.len() - ni;
            break;
        }
        if ni >= new_lines.len() {
            deleted += old_lines.len() - oi;
            break;
        }

        if old_lines[oi] == new_lines[ni] {
            oi += 1;
            ni += 1;
            continue;
        }

        let mut found = false;
        for look_ahead in 1..=3 {
            if oi + look_ahead < old_lines.len() && old_lines[oi + look_ahead] == new_lines[ni] {
                deleted += look_ahead;
                oi += look_ahead;
                found = true;
                break;
            }
            if ni + look_ahead < new_lines.len() && old_lines[oi] == new_lines[ni + look_ahead] {
                added += look_ahead;
                ni += look_ahead;
                found = true;
                break;
            }
        }

        if !found {
            deleted += 1;
            added += 1;
            oi += 1;
            ni += 1;
        }
    }

    (added as u32, deleted as u32)
}

fn parse_natural_duration(input: &str) -> Option<Duration> {
    let input = input.trim().to_lowercase();

    if let Some(days) = input.strip_suffix(" days ago") {
        if let Ok(n) = days.trim().parse::<u64>() {
            return Some(Duration::from_secs(n * 86400));
        }
    }

    if let Some(weeks) = input.strip_suffix(" weeks ago") {
        if let Ok(n) = weeks.trim().parse::<u64>() {
            return Some(Duration::from_secs(n * 7 * 86400));
        }
    }

    if let Some(months) = input.strip_suffix(" months ago") {
        if let Ok(n) = months.trim().parse::<u64>() {
            return Some(Duration::from_secs(n * 30 * 86400));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn open_rejects_a_plain_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = GitRepo::open(Some(dir.path()));
        assert!(matches!(
            result,
            Err(GitpulseError::InvalidRepository(_))
        ));
    }

    #[test]
    fn window_is_inclusive_and_compares_instants() {
        let window = TimeWindow {
            since: Some(ts("2024-01-01T00:00:00+00:00").with_timezone(&Utc)),
            until: Some(ts("2024-01-31T23:59:59+00:00").with_timezone(&Utc)),
        };

        assert!(window.contains(&ts("2024-01-01T00:00:00+00:00")));
        assert!(window.contains(&ts("2024-01-31T23:59:59+00:00")));
        assert!(!window.contains(&ts("2023-12-31T23:59:59+00:00")));
        // 2024-02-01T01:00+05:00 is 2024-01-31T20:00 UTC, inside the window.
        assert!(window.contains(&ts("2024-02-01T01:00:00+05:00")));
    }

    #[test]
    fn author_filters_apply_exclude_before_include() {
        let options = CollectOptions {
            exclude_authors: vec!["Bot".to_string()],
            include_only_authors: vec!["Ann".to_string(), "Ben".to_string()],
            ..CollectOptions::default()
        };

        assert!(options.author_allowed("Ann"));
        assert!(!options.author_allowed("Bot"));
        assert!(!options.author_allowed("Eve"));

        let open = CollectOptions::default();
        assert!(open.author_allowed("Anyone"));
    }

    #[test]
    fn natural_durations_parse_common_suffixes() {
        assert_eq!(
            parse_natural_duration("3 days ago"),
            Some(Duration::from_secs(3 * 86400))
        );
        assert_eq!(
            parse_natural_duration("2 Weeks Ago"),
            Some(Duration::from_secs(14 * 86400))
        );
        assert_eq!(parse_natural_duration("soon"), None);
    }

    #[test]
    fn short_ids_are_eight_hex_chars() {
        let id = ObjectId::from_hex(b"0123456789abcdef0123456789abcdef01234567").unwrap();
        assert_eq!(short_id(&id), "01234567");
    }
}
