use crate::cli::CommonArgs;
use crate::model::{BasicStats, FrequencyStats, StatsReport};
use crate::stats::{compute_basic_stats, compute_frequency_stats};
use crate::util::hour_label;
use anyhow::Context;
use console::style;

pub fn exec(common: CommonArgs, json: bool, frequency: bool) -> anyhow::Result<()> {
    let config = common.load_config()?;
    let repo = crate::git::GitRepo::open(common.repo.as_ref())
        .context("Failed to open git repository")?;
    let options = common.collect_options(&repo, &config)?;
    let commits = repo
        .collect_commits(&options)
        .context("Failed to collect commits from repository")?;

    let basic = compute_basic_stats(&commits);
    let freq = frequency.then(|| compute_frequency_stats(&commits));

    if json {
        let report = StatsReport {
            basic,
            frequency_analysis: freq,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(repo.path(), &basic, freq.as_ref());
    }

    Ok(())
}

fn print_text(repo_path: &std::path::Path, basic: &BasicStats, freq: Option<&FrequencyStats>) {
    println!("{}", style("Git Commit Analysis").bold());
    println!("{}", "─".repeat(50));
    println!("Repository: {}", repo_path.display());
    println!("Total commits: {}", style(basic.total_commits).cyan());

    if let Some(range) = &basic.date_range {
        println!("\nDate range:");
        println!(
            "  First commit: {}",
            style(range.first_commit.to_rfc3339()).dim()
        );
        println!(
            "  Last commit:  {}",
            style(range.last_commit.to_rfc3339()).dim()
        );
    }

    if !basic.authors.is_empty() {
        println!("\nAuthors:");
        for (author, count) in basic.authors.iter() {
            println!("  {author}: {count} commits");
        }
    }

    if let Some(freq) = freq {
        println!("\n{}", style("Frequency Analysis").bold());
        println!("{}", "─".repeat(50));

        let mut hours: Vec<_> = freq
            .hourly_distribution
            .iter()
            .map(|(&hour, &count)| (hour, count))
            .collect();
        hours.sort_by(|a, b| b.1.cmp(&a.1));

        println!("\nMost active hours (24h format):");
        for (hour, count) in hours.into_iter().take(5) {
            println!("  {} - {count} commits", hour_label(hour));
        }

        let mut weekdays: Vec<_> = freq.weekday_distribution.iter().collect();
        weekdays.sort_by(|a, b| b.1.cmp(&a.1));

        println!("\nMost active weekdays:");
        for (day, count) in weekdays {
            println!("  {day}: {count} commits");
        }
    }
}
