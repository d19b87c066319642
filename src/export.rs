//! CSV export: per-commit details, author totals, frequency buckets, and
//! the daily timeline, one file each.

use crate::cli::CommonArgs;
use crate::error::Result;
use crate::model::{BasicStats, CommitRecord, FrequencyStats};
use crate::stats::{compute_basic_stats, compute_frequency_stats};
use crate::util::{hour_label, weekday_name};
use anyhow::Context;
use chrono::Timelike;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub fn exec(common: CommonArgs, out_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let config = common.load_config()?;
    let repo = crate::git::GitRepo::open(common.repo.as_ref())
        .context("Failed to open git repository")?;
    let options = common.collect_options(&repo, &config)?;
    let commits = repo
        .collect_commits(&options)
        .context("Failed to collect commits from repository")?;

    let basic = compute_basic_stats(&commits);
    let freq = compute_frequency_stats(&commits);

    let dir = out_dir.unwrap_or_else(|| config.output.csv_directory.clone());
    std::fs::create_dir_all(&dir).context("Failed to create export directory")?;

    let commits_path = dir.join("commits.csv");
    let commit_rows = write_commit_details(&commits, &commits_path)
        .context("Failed to export commit details")?;

    let authors_path = dir.join("authors.csv");
    let author_rows =
        write_author_stats(&basic, &authors_path).context("Failed to export author stats")?;

    let frequency_path = dir.join("frequency.csv");
    let frequency_rows = write_frequency_data(&freq, &frequency_path)
        .context("Failed to export frequency data")?;

    let timeline_path = dir.join("timeline.csv");
    let timeline_rows =
        write_daily_timeline(&freq, &timeline_path).context("Failed to export daily timeline")?;

    println!("CSV files exported:");
    println!("  {} ({commit_rows} commits)", commits_path.display());
    println!("  {} ({author_rows} authors)", authors_path.display());
    println!("  {} ({frequency_rows} records)", frequency_path.display());
    println!("  {} ({timeline_rows} days)", timeline_path.display());

    Ok(())
}

/// One row per commit: identity, timestamp, message, and diff totals,
/// plus the derived weekday/hour buckets.
pub fn write_commit_details(commits: &[CommitRecord], path: &Path) -> Result<usize> {
    let mut out = BufWriter::new(File::create(path)?);
    if !commits.is_empty() {
        writeln!(
            out,
            "hash,author,author_email,date,message,files_changed,insertions,deletions,weekday,hour"
        )?;
        for commit in commits {
            writeln!(
                out,
                "{},{},{},{},{},{},{},{},{},{}",
                csv_field(&commit.id),
                csv_field(&commit.author_name),
                csv_field(&commit.author_email),
                commit.timestamp.to_rfc3339(),
                csv_field(&commit.message),
                commit.files_changed,
                commit.insertions,
                commit.deletions,
                weekday_name(&commit.timestamp),
                commit.timestamp.hour()
            )?;
        }
    }
    out.flush()?;
    Ok(commits.len())
}

/// Author totals, highest commit count first, with a percentage column.
pub fn write_author_stats(basic: &BasicStats, path: &Path) -> Result<usize> {
    let mut out = BufWriter::new(File::create(path)?);
    let authors = basic.authors.sorted_by_count();
    if !authors.is_empty() {
        writeln!(out, "author,commit_count,percentage")?;
        for (author, count) in &authors {
            let percentage = *count as f64 / basic.total_commits as f64 * 100.0;
            writeln!(out, "{},{count},{percentage:.2}", csv_field(author))?;
        }
    }
    out.flush()?;
    Ok(authors.len())
}

/// Hourly, weekday, and monthly buckets flattened into
/// (type, category, count) rows.
pub fn write_frequency_data(freq: &FrequencyStats, path: &Path) -> Result<usize> {
    let mut out = BufWriter::new(File::create(path)?);
    let mut rows = 0usize;

    let empty = freq.hourly_distribution.is_empty()
        && freq.weekday_distribution.is_empty()
        && freq.monthly_commits.is_empty();
    if !empty {
        writeln!(out, "type,category,count")?;
        for (&hour, count) in &freq.hourly_distribution {
            writeln!(out, "hourly,{},{count}", hour_label(hour))?;
            rows += 1;
        }
        for (day, count) in freq.weekday_distribution.iter() {
            writeln!(out, "weekday,{day},{count}")?;
            rows += 1;
        }
        for (month, count) in &freq.monthly_commits {
            writeln!(out, "monthly,{month},{count}")?;
            rows += 1;
        }
    }

    out.flush()?;
    Ok(rows)
}

/// Commits per calendar date, chronological.
pub fn write_daily_timeline(freq: &FrequencyStats, path: &Path) -> Result<usize> {
    let mut out = BufWriter::new(File::create(path)?);
    if !freq.daily_commits.is_empty() {
        writeln!(out, "date,commits")?;
        for (date, count) in &freq.daily_commits {
            writeln!(out, "{date},{count}")?;
        }
    }
    out.flush()?;
    Ok(freq.daily_commits.len())
}

/// Quote a field per RFC 4180 when it contains a separator, quote, or
/// newline; otherwise pass it through untouched.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
