#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::Command;

pub fn has_git() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

fn git(dir: &Path, args: &[&str]) {
    assert!(Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

pub fn init_git_repo(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    git(dir, &["init", "-q"]);
    git(dir, &["config", "core.autocrlf", "false"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
    git(dir, &["config", "user.email", "you@example.com"]);
    git(dir, &["config", "user.name", "Your Name"]);
}

/// Write `content` to `name` and commit it as `author` at noon on `date` (YYYY-MM-DD).
pub fn commit_file(dir: &Path, name: &str, content: &[u8], author: &str, date: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut f = File::create(&path).unwrap();
    f.write_all(content).unwrap();
    f.sync_all().unwrap();

    git(dir, &["add", "."]);
    git_as(dir, &["commit", "-q", "-m", &format!("update {name}")], author, date);
}

/// Run a committing git command as `author` at noon on `date` (YYYY-MM-DD).
pub fn git_as(dir: &Path, args: &[&str], author: &str, date: &str) {
    let stamp = format!("{date}T12:00:00");
    assert!(Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", author)
        .env("GIT_AUTHOR_EMAIL", "dev@example.com")
        .env("GIT_COMMITTER_NAME", author)
        .env("GIT_COMMITTER_EMAIL", "dev@example.com")
        .env("GIT_AUTHOR_DATE", &stamp)
        .env("GIT_COMMITTER_DATE", &stamp)
        .status()
        .unwrap()
        .success());
}

/// A repository with one commit before the window, two by "Alice", one by "Bob" touching a
/// binary file, and one by "CI Bot".
pub fn sample_repo(dir: &Path) {
    init_git_repo(dir);
    commit_file(dir, "c.txt", b"old\n", "Carol", "2023-12-01");
    commit_file(dir, "a.txt", b"one\ntwo\nthree\n", "Alice", "2024-01-05");
    commit_file(dir, "a.txt", b"one\nTWO\nthree\n", "Alice", "2024-01-05");
    fs::write(dir.join("logo.bin"), b"\x00\x01\x02binary\x00").unwrap();
    commit_file(dir, "b.txt", b"x\ny\n", "Bob", "2024-02-01");
    commit_file(dir, "ci.txt", b"generated\n", "CI Bot", "2024-02-02");
}

/// Alice commits on the main line, Bob adds a two-line file on `feature`, and Carol merges it
/// with `--no-ff`, so the merge's first-parent diff is Bob's two lines.
pub fn merge_repo(dir: &Path) {
    init_git_repo(dir);
    commit_file(dir, "base.txt", b"base\n", "Alice", "2024-01-10");
    git(dir, &["checkout", "-q", "-b", "feature"]);
    commit_file(dir, "feature.txt", b"one\ntwo\n", "Bob", "2024-01-11");
    git(dir, &["checkout", "-q", "-"]);
    git_as(dir, &["merge", "-q", "--no-ff", "-m", "merge feature", "feature"], "Carol", "2024-01-12");
}
