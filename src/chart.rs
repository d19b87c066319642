//! PNG chart rendering for the frequency distributions: hourly bars with
//! the peak hour highlighted, weekday bars, and a daily commit timeline.

use crate::cli::CommonArgs;
use crate::config::ChartConfig;
use crate::error::{GitpulseError, Result};
use crate::model::{FrequencyStats, WEEKDAY_NAMES};
use crate::stats::compute_frequency_stats;
use anyhow::Context;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

const BAR_WIDTH: f64 = 0.8;
const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const HIGHLIGHT_ORANGE: RGBColor = RGBColor(255, 165, 0);
const TIMELINE_BLUE: RGBColor = RGBColor(70, 130, 180);

// One color per weekday, Monday first.
const WEEKDAY_COLORS: [RGBColor; 7] = [
    RGBColor(255, 153, 153),
    RGBColor(102, 179, 255),
    RGBColor(153, 255, 153),
    RGBColor(255, 204, 153),
    RGBColor(255, 153, 204),
    RGBColor(194, 194, 240),
    RGBColor(255, 179, 230),
];

/// Paths of the charts that were actually rendered. Charts for empty
/// distributions are skipped and stay `None`.
#[derive(Debug, Clone, Default)]
pub struct ChartSet {
    pub hourly: Option<PathBuf>,
    pub weekday: Option<PathBuf>,
    pub timeline: Option<PathBuf>,
}

impl ChartSet {
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.hourly
            .iter()
            .chain(self.weekday.iter())
            .chain(self.timeline.iter())
            .map(PathBuf::as_path)
    }

    pub fn is_empty(&self) -> bool {
        self.files().next().is_none()
    }
}

pub fn exec(common: CommonArgs, out_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let config = common.load_config()?;
    let repo = crate::git::GitRepo::open(common.repo.as_ref())
        .context("Failed to open git repository")?;
    let options = common.collect_options(&repo, &config)?;
    let commits = repo
        .collect_commits(&options)
        .context("Failed to collect commits from repository")?;

    let freq = compute_frequency_stats(&commits);
    let dir = out_dir.unwrap_or_else(|| config.output.plots_directory.clone());
    let charts = render_all(&freq, &dir, &config.charts).context("Failed to render charts")?;

    if charts.is_empty() {
        println!("No commits to chart");
    } else {
        println!("Charts generated:");
        for path in charts.files() {
            println!("  Created: {}", path.display());
        }
    }

    Ok(())
}

/// Render every chart with data into `out_dir`, creating it if needed.
pub fn render_all(freq: &FrequencyStats, out_dir: &Path, config: &ChartConfig) -> Result<ChartSet> {
    let mut charts = ChartSet::default();
    if freq.hourly_distribution.is_empty()
        && freq.weekday_distribution.is_empty()
        && freq.daily_commits.is_empty()
    {
        return Ok(charts);
    }
    std::fs::create_dir_all(out_dir)?;

    if !freq.hourly_distribution.is_empty() {
        let path = out_dir.join("hourly_distribution.png");
        render_hourly(freq, &path, config)?;
        charts.hourly = Some(path);
    }
    if !freq.weekday_distribution.is_empty() {
        let path = out_dir.join("weekday_distribution.png");
        render_weekday(freq, &path, config)?;
        charts.weekday = Some(path);
    }
    if !freq.daily_commits.is_empty() {
        let path = out_dir.join("commit_timeline.png");
        render_timeline(freq, &path, config)?;
        charts.timeline = Some(path);
    }

    Ok(charts)
}

fn render_err<E: std::fmt::Display>(e: E) -> GitpulseError {
    GitpulseError::Render(e.to_string())
}

fn render_hourly(freq: &FrequencyStats, path: &Path, config: &ChartConfig) -> Result<()> {
    let counts: Vec<u64> = (0..24)
        .map(|hour| freq.hourly_distribution.get(&hour).copied().unwrap_or(0))
        .collect();
    let peak_hour = counts
        .iter()
        .enumerate()
        .max_by_key(|&(_, count)| count)
        .map(|(hour, _)| hour)
        .unwrap_or(0);
    let y_max = y_ceiling(counts.iter().copied().max().unwrap_or(0));

    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Commit Distribution by Hour", ("sans-serif", 30))
        .margin(10)
        .set_all_label_area_size(50)
        .build_cartesian_2d(0f64..24f64, 0f64..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .light_line_style(TRANSPARENT)
        .bold_line_style(BLACK.mix(0.1))
        .x_desc("Hour of Day")
        .y_desc("Number of Commits")
        .label_style(("sans-serif", 15))
        .x_label_formatter(&|x| {
            let hour = *x as u32;
            // Label every other hour to keep the axis readable.
            if *x >= 0.0 && hour < 24 && hour % 2 == 0 {
                format!("{hour:02}")
            } else {
                String::new()
            }
        })
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(counts.iter().enumerate().map(|(hour, &count)| {
            let color = if hour == peak_hour && count > 0 {
                HIGHLIGHT_ORANGE
            } else {
                SKY_BLUE
            };
            let x0 = hour as f64 + (1.0 - BAR_WIDTH) / 2.0;
            Rectangle::new([(x0, 0.0), (x0 + BAR_WIDTH, count as f64)], color.filled())
        }))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

fn render_weekday(freq: &FrequencyStats, path: &Path, config: &ChartConfig) -> Result<()> {
    let counts: Vec<u64> = freq
        .weekday_distribution
        .iter_all()
        .map(|(_, count)| count)
        .collect();
    let y_max = y_ceiling(counts.iter().copied().max().unwrap_or(0));

    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Commit Distribution by Weekday", ("sans-serif", 30))
        .margin(10)
        .set_all_label_area_size(60)
        .build_cartesian_2d(0f64..7f64, 0f64..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .light_line_style(TRANSPARENT)
        .bold_line_style(BLACK.mix(0.1))
        .y_desc("Number of Commits")
        .label_style(("sans-serif", 15))
        .x_labels(7)
        .x_label_formatter(&|x| {
            let idx = *x as usize;
            if (x - idx as f64).abs() < f64::EPSILON && idx < 7 {
                WEEKDAY_NAMES[idx].to_string()
            } else {
                String::new()
            }
        })
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(counts.iter().enumerate().map(|(idx, &count)| {
            let x0 = idx as f64 + (1.0 - BAR_WIDTH) / 2.0;
            Rectangle::new(
                [(x0, 0.0), (x0 + BAR_WIDTH, count as f64)],
                WEEKDAY_COLORS[idx].mix(0.8).filled(),
            )
        }))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

fn render_timeline(freq: &FrequencyStats, path: &Path, config: &ChartConfig) -> Result<()> {
    // BTreeMap iteration gives dates in chronological order.
    let dates: Vec<&str> = freq.daily_commits.keys().map(String::as_str).collect();
    let points: Vec<(f64, f64)> = freq
        .daily_commits
        .values()
        .enumerate()
        .map(|(i, &count)| (i as f64, count as f64))
        .collect();
    let y_max = y_ceiling(freq.daily_commits.values().copied().max().unwrap_or(0));
    let x_max = (points.len() as f64 - 1.0).max(1.0);

    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Commit Activity Timeline", ("sans-serif", 30))
        .margin(10)
        .set_all_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)
        .map_err(render_err)?;

    let label_dates = dates.clone();
    let x_label_formatter = move |x: &f64| {
        let idx = *x as usize;
        if idx < label_dates.len() {
            // Show fewer labels to prevent overlap
            if idx == 0
                || idx == label_dates.len() - 1
                || (idx % (label_dates.len() / 4).max(1) == 0
                    && idx > 0
                    && idx < label_dates.len() - 1)
            {
                label_dates[idx].to_string()
            } else {
                String::new()
            }
        } else {
            String::new()
        }
    };

    chart
        .configure_mesh()
        .light_line_style(TRANSPARENT)
        .bold_line_style(BLACK.mix(0.1))
        .y_desc("Number of Commits")
        .label_style(("sans-serif", 15))
        .x_label_formatter(&x_label_formatter)
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(
            points.iter().copied(),
            TIMELINE_BLUE.stroke_width(2),
        ))
        .map_err(render_err)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, TIMELINE_BLUE.filled())),
        )
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Leave headroom above the tallest bar; never collapse to a zero range.
fn y_ceiling(max_count: u64) -> f64 {
    ((max_count as f64) * 1.2).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CommitRecord;
    use crate::stats::compute_frequency_stats;
    use chrono::DateTime;

    fn commit(rfc3339: &str) -> CommitRecord {
        CommitRecord {
            id: "0000000".to_string(),
            author_name: "A".to_string(),
            author_email: "a@example.com".to_string(),
            timestamp: DateTime::parse_from_rfc3339(rfc3339).unwrap(),
            message: "m".to_string(),
            files_changed: 1,
            insertions: 1,
            deletions: 0,
        }
    }

    #[test]
    fn renders_all_three_charts_for_non_empty_history() {
        let commits = vec![
            commit("2024-01-01T10:00:00+00:00"),
            commit("2024-01-02T14:00:00+00:00"),
            commit("2024-01-03T10:00:00+00:00"),
        ];
        let freq = compute_frequency_stats(&commits);
        let dir = tempfile::tempdir().unwrap();

        let charts = render_all(&freq, dir.path(), &ChartConfig::default()).unwrap();
        for path in charts.files() {
            let metadata = std::fs::metadata(path).unwrap();
            assert!(metadata.len() > 0);
        }
        assert!(charts.hourly.is_some());
        assert!(charts.weekday.is_some());
        assert!(charts.timeline.is_some());
    }

    #[test]
    fn empty_history_renders_nothing() {
        let freq = FrequencyStats::default();
        let dir = tempfile::tempdir().unwrap();

        let charts = render_all(&freq, dir.path().join("plots").as_path(), &ChartConfig::default())
            .unwrap();
        assert!(charts.is_empty());
        // The output directory is not even created for an empty history.
        assert!(!dir.path().join("plots").exists());
    }

    #[test]
    fn single_data_point_still_renders() {
        let commits = vec![commit("2024-01-07T23:15:00+00:00")];
        let freq = compute_frequency_stats(&commits);
        let dir = tempfile::tempdir().unwrap();

        let charts = render_all(&freq, dir.path(), &ChartConfig::default()).unwrap();
        assert!(charts.timeline.is_some());
    }

    #[test]
    fn y_ceiling_never_collapses() {
        assert_eq!(y_ceiling(0), 1.0);
        assert!(y_ceiling(10) > 10.0);
    }
}
