use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::git::{CollectOptions, GitRepo};

#[derive(Parser)]
#[command(name = "gitpulse")]
#[command(about = "Analyze git commit history: statistics, charts, reports, and CSV exports")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, help = "Path to git repository")]
    pub repo: Option<PathBuf>,

    #[arg(long, help = "Path to a gitpulse.json config file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Include merge commits")]
    pub include_merges: bool,

    #[arg(long, help = "Analyze at most N commits, newest first")]
    pub max_commits: Option<usize>,

    #[arg(long, help = "Only count commits by this author (repeatable)")]
    pub author: Vec<String>,

    #[arg(long, help = "Skip commits by this author (repeatable)")]
    pub exclude_author: Vec<String>,

    #[arg(long, help = "Start from this commit or date (RFC3339, YYYY-MM-DD, or natural language)")]
    pub since: Option<String>,

    #[arg(long, help = "End at this commit or date (RFC3339, YYYY-MM-DD, or natural language)")]
    pub until: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print commit statistics as text or JSON
    Stats {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(short, long, help = "Include commit frequency analysis")]
        frequency: bool,
    },
    /// Render PNG charts of the commit frequency distributions
    Chart {
        #[arg(long, help = "Directory for the rendered charts")]
        out_dir: Option<PathBuf>,
    },
    /// Generate a standalone HTML report
    Report {
        #[arg(long, help = "Report file path")]
        out: Option<PathBuf>,

        #[arg(long, help = "Render charts and embed them in the report")]
        charts: bool,
    },
    /// Export commit, author, and frequency data as CSV files
    Export {
        #[arg(long, help = "Directory for the CSV files")]
        out_dir: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Stats { json, frequency } => {
                crate::summary::exec(self.common, json, frequency)
            }
            Commands::Chart { out_dir } => crate::chart::exec(self.common, out_dir),
            Commands::Report { out, charts } => crate::report::exec(self.common, out, charts),
            Commands::Export { out_dir } => crate::export::exec(self.common, out_dir),
        }
    }
}

impl CommonArgs {
    pub fn load_config(&self) -> Result<Config> {
        Config::load(self.config.as_deref()).context("Failed to load configuration")
    }

    /// Resolve flags against the config (flags win) into collection
    /// options for the commit source.
    pub fn collect_options(&self, repo: &GitRepo, config: &Config) -> Result<CollectOptions> {
        let since = self.since.as_deref().or(config.filtering.since.as_deref());
        let until = self.until.as_deref().or(config.filtering.until.as_deref());
        let window = repo
            .resolve_window(since, until)
            .context("Failed to resolve date range")?;

        let include_only_authors = if self.author.is_empty() {
            config.filtering.include_only_authors.clone()
        } else {
            self.author.clone()
        };
        let exclude_authors = if self.exclude_author.is_empty() {
            config.filtering.exclude_authors.clone()
        } else {
            self.exclude_author.clone()
        };

        Ok(CollectOptions {
            window,
            include_merges: self.include_merges || config.analysis.include_merges,
            max_commits: self.max_commits.or(config.analysis.max_commits),
            exclude_authors,
            include_only_authors,
        })
    }
}
