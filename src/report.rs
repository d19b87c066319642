//! Standalone HTML report: summary cards, author table, frequency tables,
//! and optional embedded chart images.

use crate::chart::ChartSet;
use crate::cli::CommonArgs;
use crate::error::Result;
use crate::model::{BasicStats, FrequencyStats};
use crate::stats::{compute_basic_stats, compute_frequency_stats};
use crate::util::hour_label;
use anyhow::Context;
use chrono::Utc;
use std::path::{Path, PathBuf};

pub fn exec(common: CommonArgs, out: Option<PathBuf>, charts: bool) -> anyhow::Result<()> {
    let config = common.load_config()?;
    let repo = crate::git::GitRepo::open(common.repo.as_ref())
        .context("Failed to open git repository")?;
    let options = common.collect_options(&repo, &config)?;
    let commits = repo
        .collect_commits(&options)
        .context("Failed to collect commits from repository")?;

    let basic = compute_basic_stats(&commits);
    let freq = compute_frequency_stats(&commits);

    let out_path = out.unwrap_or_else(|| config.output.reports_directory.join("report.html"));
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).context("Failed to create report directory")?;
        }
    }

    // Charts land next to the report so the <img> references stay
    // relative and the report directory is self-contained.
    let chart_set = if charts {
        let chart_dir = out_path.parent().unwrap_or_else(|| Path::new("."));
        crate::chart::render_all(&freq, chart_dir, &config.charts)
            .context("Failed to render charts")?
    } else {
        ChartSet::default()
    };

    write_report(&basic, &freq, repo.path(), &out_path, &chart_set)
        .context("Failed to write HTML report")?;

    let shown = std::fs::canonicalize(&out_path).unwrap_or(out_path);
    println!("HTML report generated: {}", shown.display());
    Ok(())
}

/// Render the report to `path`. Chart paths in `charts` are referenced by
/// file name, so they are expected to live next to the report.
pub fn write_report(
    basic: &BasicStats,
    freq: &FrequencyStats,
    repo_path: &Path,
    path: &Path,
    charts: &ChartSet,
) -> Result<()> {
    let mut body = String::new();

    body.push_str(&format!(
        "<h1>Git Commit Analysis</h1>\n\
         <p class=\"meta\">Repository: <code>{}</code><br>\n\
         Generated: {}</p>\n",
        escape(&repo_path.display().to_string()),
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    ));

    body.push_str("<h2>Summary</h2>\n<ul>\n");
    body.push_str(&format!(
        "<li>Total commits: <strong>{}</strong></li>\n",
        basic.total_commits
    ));
    if let Some(range) = &basic.date_range {
        body.push_str(&format!(
            "<li>First commit: {}</li>\n<li>Last commit: {}</li>\n",
            escape(&range.first_commit.to_rfc3339()),
            escape(&range.last_commit.to_rfc3339())
        ));
    }
    body.push_str("</ul>\n");

    if !basic.authors.is_empty() {
        body.push_str(
            "<h2>Authors</h2>\n<table>\n<tr><th>Author</th><th>Commits</th><th>Share</th></tr>\n",
        );
        for (author, count) in basic.authors.sorted_by_count() {
            let share = count as f64 / basic.total_commits as f64 * 100.0;
            body.push_str(&format!(
                "<tr><td>{}</td><td>{count}</td><td>{share:.1}%</td></tr>\n",
                escape(author)
            ));
        }
        body.push_str("</table>\n");
    }

    if !freq.hourly_distribution.is_empty() {
        body.push_str("<h2>Frequency</h2>\n");

        let mut hours: Vec<_> = freq
            .hourly_distribution
            .iter()
            .map(|(&hour, &count)| (hour, count))
            .collect();
        hours.sort_by(|a, b| b.1.cmp(&a.1));
        body.push_str("<h3>Most active hours</h3>\n<table>\n<tr><th>Hour</th><th>Commits</th></tr>\n");
        for (hour, count) in hours.into_iter().take(5) {
            body.push_str(&format!(
                "<tr><td>{}</td><td>{count}</td></tr>\n",
                hour_label(hour)
            ));
        }
        body.push_str("</table>\n");

        body.push_str("<h3>Weekdays</h3>\n<table>\n<tr><th>Day</th><th>Commits</th></tr>\n");
        for (day, count) in freq.weekday_distribution.iter() {
            body.push_str(&format!("<tr><td>{day}</td><td>{count}</td></tr>\n"));
        }
        body.push_str("</table>\n");
    }

    let chart_imgs: Vec<String> = charts
        .files()
        .filter_map(|p| p.file_name())
        .map(|name| {
            format!(
                "<img src=\"{0}\" alt=\"{0}\">\n",
                escape(&name.to_string_lossy())
            )
        })
        .collect();
    if !chart_imgs.is_empty() {
        body.push_str("<h2>Charts</h2>\n");
        for img in chart_imgs {
            body.push_str(&img);
        }
    }

    let html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Git Commit Analysis</title>\n<style>\n{STYLE}</style>\n</head>\n\
         <body>\n{body}</body>\n</html>\n"
    );

    std::fs::write(path, html)?;
    Ok(())
}

const STYLE: &str = "\
body { font-family: sans-serif; max-width: 60rem; margin: 2rem auto; color: #222; }\n\
table { border-collapse: collapse; margin: 1rem 0; }\n\
th, td { border: 1px solid #ccc; padding: 0.3rem 0.8rem; text-align: left; }\n\
th { background: #f0f0f0; }\n\
img { max-width: 100%; margin: 1rem 0; }\n\
.meta { color: #666; }\n";

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
