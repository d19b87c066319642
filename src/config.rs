//! Typed configuration, loaded once at startup and passed by value into
//! the commands. Every field has a default so a missing or partial file
//! behaves like the built-in configuration; validation happens at load
//! time, not at use sites.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GitpulseError, Result};

/// Name of the config file picked up from the working directory when no
/// `--config` path is given.
pub const DEFAULT_CONFIG_FILE: &str = "gitpulse.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub analysis: AnalysisConfig,
    pub filtering: FilterConfig,
    pub charts: ChartConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub plots_directory: PathBuf,
    pub reports_directory: PathBuf,
    pub csv_directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            plots_directory: PathBuf::from("plots"),
            reports_directory: PathBuf::from("reports"),
            csv_directory: PathBuf::from("csv_exports"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub include_merges: bool,
    /// Cap on the number of commits analyzed, newest first. `None` means
    /// the full history.
    pub max_commits: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub exclude_authors: Vec<String>,
    pub include_only_authors: Vec<String>,
    pub since: Option<String>,
    pub until: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
        }
    }
}

impl Config {
    /// Load from an explicit path, or from [`DEFAULT_CONFIG_FILE`] if it
    /// exists, or fall back to defaults. An explicit path that cannot be
    /// read or parsed is an error; a missing default file is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(explicit) => Self::from_file(explicit),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GitpulseError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Config = serde_json::from_str(&contents).map_err(|e| {
            GitpulseError::Config(format!("cannot parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.analysis.max_commits == Some(0) {
            return Err(GitpulseError::Config(
                "analysis.max_commits must be at least 1 when set".to_string(),
            ));
        }
        if self.charts.width == 0 || self.charts.height == 0 {
            return Err(GitpulseError::Config(
                "charts.width and charts.height must be non-zero".to_string(),
            ));
        }
        for author in &self.filtering.include_only_authors {
            if self.filtering.exclude_authors.contains(author) {
                return Err(GitpulseError::Config(format!(
                    "author '{author}' is both included and excluded"
                )));
            }
        }
        Ok(())
    }
}
