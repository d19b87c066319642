//! Commit history analysis for git repositories: author and frequency
//! statistics with text, JSON, CSV, chart, and HTML report output.

pub mod chart;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod git;
pub mod model;
pub mod report;
pub mod stats;
pub mod summary;
pub mod util;
