mod common;

use assert_cmd::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn workspace(root: &Path) {
    common::sample_repo(&root.join("api"));
    let web = root.join("web");
    common::init_git_repo(&web);
    common::commit_file(&web, "index.html", b"<html>\n</html>\n", "Dave", "2024-03-10");
}

fn gitcontrib(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gitcontrib").unwrap();
    cmd.env_remove("GITCONTRIB_LOG")
        .arg("--root")
        .arg(root)
        .args(["--since", "2024-01-01", "--until", "2024-12-31"])
        .args(["--alias", "Alice=alice.smith", "--exclude-author", "CI Bot"]);
    cmd
}

#[test]
fn report_json_writes_every_file() {
    if !common::has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    let root = dir.path().join("src");
    workspace(&root);
    let out_dir = dir.path().join("reports");

    let out = gitcontrib(&root)
        .arg("--output-dir")
        .arg(&out_dir)
        .args(["report", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(v["version"], 1);
    assert_eq!(v["repositories_scanned"], 2);
    assert_eq!(v["repositories_with_data"], 2);
    let authors: Vec<(&str, u64)> = v["author_summary"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| (r["author"].as_str().unwrap(), r["commits"].as_u64().unwrap()))
        .collect();
    assert_eq!(authors, vec![("alice.smith", 2), ("bob", 1), ("dave", 1)]);
    assert_eq!(v["monthly"]["months"].as_array().unwrap().len(), 3);

    for kind in [
        "author_summary.csv",
        "daily_activity.csv",
        "repository_summary.csv",
        "detailed_report.txt",
        "contribution_graph.png",
    ] {
        let name = format!("git_commits_{}", kind.replace('.', "_20240105_20240310."));
        assert!(out_dir.join(&name).is_file(), "missing {name}");
    }

    let csv = fs::read_to_string(out_dir.join("git_commits_author_summary_20240105_20240310.csv")).unwrap();
    assert_eq!(csv.lines().next(), Some("author,commits,additions,deletions,total_lines"));
    assert_eq!(csv.lines().nth(1), Some("alice.smith,2,4,1,5"));
}

#[test]
fn report_without_chart_skips_png() {
    if !common::has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    let root = dir.path().join("src");
    workspace(&root);
    let out_dir = dir.path().join("reports");

    gitcontrib(&root)
        .arg("--output-dir")
        .arg(&out_dir)
        .args(["report", "--no-chart"])
        .assert()
        .success();

    let names: Vec<String> = fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 4);
    assert!(names.iter().all(|n| !n.ends_with(".png")));
}

#[test]
fn authors_ndjson_has_one_line_per_author() {
    if !common::has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    let root = dir.path().join("src");
    workspace(&root);

    let out = gitcontrib(&root)
        .args(["authors", "--ndjson"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let rows: Vec<serde_json::Value> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2]["author"], "dave");
    assert_eq!(rows[2]["total_lines"], 2);
}

#[test]
fn discover_json_lists_repositories() {
    if !common::has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    let root = dir.path().join("src");
    workspace(&root);
    fs::create_dir_all(root.join("archive/old/.git")).unwrap();

    let out = gitcontrib(&root)
        .args(["discover", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let names: Vec<&str> = v
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["api", "web"]);
    assert!(v.as_array().unwrap().iter().all(|r| r["is_repository"] == true));
}

#[test]
fn no_commits_in_window_is_an_error() {
    if !common::has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    let root = dir.path().join("src");
    let old = root.join("old");
    common::init_git_repo(&old);
    common::commit_file(&old, "a.txt", b"a\n", "Erin", "2019-05-01");

    let out = gitcontrib(&root)
        .arg("--output-dir")
        .arg(dir.path().join("reports"))
        .arg("report")
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8_lossy(&out);
    assert!(stderr.contains("No data found in any repository"), "{stderr}");
    assert!(!dir.path().join("reports").exists());
}

#[test]
fn inverted_window_is_rejected() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("gitcontrib")
        .unwrap()
        .arg("--root")
        .arg(dir.path())
        .args(["--since", "2024-05-01", "--until", "2024-04-01", "authors"])
        .assert()
        .failure();
}
