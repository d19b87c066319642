use assert_cmd::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn has_git() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

fn init_git_repo(dir: &Path) {
    // init and basic identity
    assert!(Command::new("git")
        .args(["init"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
    assert!(Command::new("git")
        .args(["config", "core.autocrlf", "false"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
    assert!(Command::new("git")
        .args(["config", "user.email", "you@example.com"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
    assert!(Command::new("git")
        .args(["config", "user.name", "Your Name"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

fn commit_file(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut f = File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f.sync_all().unwrap();
    assert!(Command::new("git")
        .args(["add", "."])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
    assert!(Command::new("git")
        .args(["commit", "-m", &format!("add {name}")])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

fn stats_json(dir: &Path, extra: &[&str]) -> serde_json::Value {
    let mut cmd = Command::cargo_bin("gitpulse").unwrap();
    cmd.current_dir(dir)
        .arg("--repo")
        .arg(dir)
        .args(extra)
        .args(["stats", "--json"]);
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

#[test]
fn stats_json_reports_totals_and_authors() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "src/a.rs", "fn a(){}\n");
    commit_file(dir.path(), "src/b.rs", "fn b(){}\n");

    let v = stats_json(dir.path(), &[]);
    assert_eq!(v["total_commits"].as_u64(), Some(2));
    assert_eq!(v["authors"]["Your Name"].as_u64(), Some(2));
    assert!(v["date_range"]["first_commit"].is_string());
    assert!(v["date_range"]["last_commit"].is_string());
    assert!(v.get("frequency_analysis").is_none());
}

#[test]
fn frequency_flag_adds_distributions_that_sum_to_total() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "a.txt", "1\n");
    commit_file(dir.path(), "b.txt", "2\n");
    commit_file(dir.path(), "c.txt", "3\n");

    let mut cmd = Command::cargo_bin("gitpulse").unwrap();
    cmd.current_dir(dir.path())
        .arg("--repo")
        .arg(dir.path())
        .args(["stats", "--json", "--frequency"]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();

    let total = v["total_commits"].as_u64().unwrap();
    let freq = &v["frequency_analysis"];
    for key in ["hourly_distribution", "daily_commits", "weekday_distribution"] {
        let sum: u64 = freq[key]
            .as_object()
            .unwrap()
            .values()
            .map(|c| c.as_u64().unwrap())
            .sum();
        assert_eq!(sum, total, "{key} should account for every commit");
    }
}

#[test]
fn empty_repository_yields_zero_stats() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());

    let v = stats_json(dir.path(), &[]);
    assert_eq!(v["total_commits"].as_u64(), Some(0));
    assert!(v["authors"].as_object().unwrap().is_empty());
    assert!(v["date_range"].is_null());
}

#[test]
fn non_repository_path_fails() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("gitpulse").unwrap();
    cmd.current_dir(dir.path())
        .arg("--repo")
        .arg(dir.path())
        .args(["stats", "--json"]);
    cmd.assert().failure();
}

#[test]
fn include_merges_flag_affects_counts() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());

    commit_file(dir.path(), "file.txt", "a\n");

    assert!(Command::new("git")
        .args(["checkout", "-b", "feat"])
        .current_dir(dir.path())
        .status()
        .unwrap()
        .success());
    commit_file(dir.path(), "feat.txt", "f1\n");

    assert!(Command::new("git")
        .args(["checkout", "-"])
        .current_dir(dir.path())
        .status()
        .unwrap()
        .success());
    commit_file(dir.path(), "file.txt", "a\nc\n");

    assert!(Command::new("git")
        .args(["merge", "--no-ff", "feat", "-m", "merge feat"])
        .current_dir(dir.path())
        .status()
        .unwrap()
        .success());

    let without = stats_json(dir.path(), &[])["total_commits"]
        .as_u64()
        .unwrap();
    let with = stats_json(dir.path(), &["--include-merges"])["total_commits"]
        .as_u64()
        .unwrap();
    assert_eq!(without, 3);
    assert_eq!(with, 4);
}

#[test]
fn export_writes_all_csv_files() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "a.txt", "1\n");
    commit_file(dir.path(), "b.txt", "2\n");

    let out_dir = dir.path().join("csv");
    let mut cmd = Command::cargo_bin("gitpulse").unwrap();
    cmd.current_dir(dir.path())
        .arg("--repo")
        .arg(dir.path())
        .args(["export", "--out-dir"])
        .arg(&out_dir);
    cmd.assert().success();

    for name in ["commits.csv", "authors.csv", "frequency.csv", "timeline.csv"] {
        assert!(out_dir.join(name).is_file(), "missing {name}");
    }

    let details = fs::read_to_string(out_dir.join("commits.csv")).unwrap();
    assert!(details.starts_with("hash,author,author_email,date,message"));
    assert_eq!(details.lines().count(), 3);
}

#[test]
fn report_produces_html_with_charts() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "a.txt", "1\n");

    let out = dir.path().join("report").join("report.html");
    let mut cmd = Command::cargo_bin("gitpulse").unwrap();
    cmd.current_dir(dir.path())
        .arg("--repo")
        .arg(dir.path())
        .args(["report", "--charts", "--out"])
        .arg(&out);
    cmd.assert().success();

    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("Total commits: <strong>1</strong>"));
    assert!(html.contains("hourly_distribution.png"));
    assert!(out.parent().unwrap().join("hourly_distribution.png").is_file());
}

#[test]
fn chart_command_writes_png_files() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "a.txt", "1\n");

    let out_dir = dir.path().join("plots");
    let mut cmd = Command::cargo_bin("gitpulse").unwrap();
    cmd.current_dir(dir.path())
        .arg("--repo")
        .arg(dir.path())
        .args(["chart", "--out-dir"])
        .arg(&out_dir);
    cmd.assert().success();

    for name in [
        "hourly_distribution.png",
        "weekday_distribution.png",
        "commit_timeline.png",
    ] {
        assert!(out_dir.join(name).is_file(), "missing {name}");
    }
}

#[test]
fn author_filter_limits_counts() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "a.txt", "1\n");

    assert!(Command::new("git")
        .args(["config", "user.name", "Other Dev"])
        .current_dir(dir.path())
        .status()
        .unwrap()
        .success());
    commit_file(dir.path(), "b.txt", "2\n");

    let v = stats_json(dir.path(), &["--author", "Other Dev"]);
    assert_eq!(v["total_commits"].as_u64(), Some(1));
    assert_eq!(v["authors"]["Other Dev"].as_u64(), Some(1));
    assert!(v["authors"].get("Your Name").is_none());

    let v = stats_json(dir.path(), &["--exclude-author", "Other Dev"]);
    assert_eq!(v["total_commits"].as_u64(), Some(1));
    assert!(v["authors"].get("Other Dev").is_none());
}

#[test]
fn config_file_is_honored() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "a.txt", "1\n");
    commit_file(dir.path(), "b.txt", "2\n");
    commit_file(dir.path(), "c.txt", "3\n");

    let config_path = dir.path().join("gitpulse.json");
    fs::write(&config_path, r#"{ "analysis": { "max_commits": 2 } }"#).unwrap();

    let v = stats_json(dir.path(), &["--config", config_path.to_str().unwrap()]);
    assert_eq!(v["total_commits"].as_u64(), Some(2));
}
