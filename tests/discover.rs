mod common;

use gitcontrib::config::RepositoryConfig;
use gitcontrib::discover::{repository_depth, RepositoryLocator};
use gitcontrib::git::Git;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

fn marker_dir(root: &Path, rel: &str) {
    fs::create_dir_all(root.join(rel).join(".git")).unwrap();
}

fn locate(roots: Vec<PathBuf>, min_depth: usize, max_depth: usize, excluded: &[&str]) -> Vec<PathBuf> {
    let git = Git::new("git", Duration::from_secs(30));
    let config = RepositoryConfig {
        roots,
        excluded_paths: excluded.iter().map(|s| s.to_string()).collect(),
        min_depth,
        max_depth,
    };
    RepositoryLocator::new(&git, &config)
        .locate()
        .into_iter()
        .map(|r| r.path)
        .collect()
}

#[test]
fn only_markers_within_depth_bounds_are_returned() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    marker_dir(&root, "shallow");
    marker_dir(&root, "group/middle");
    marker_dir(&root, "group/deeper/deepest");

    let found = locate(vec![root.clone()], 2, 2, &[]);
    assert_eq!(found, vec![root.join("group/middle")]);

    for path in locate(vec![root.clone()], 1, 3, &[]) {
        let depth = repository_depth(&root, &path).unwrap();
        assert!((1..=3).contains(&depth), "{} at depth {depth}", path.display());
    }
}

#[test]
fn excluded_substrings_are_never_returned() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    marker_dir(&root, "keep/one");
    marker_dir(&root, "archive/two");
    marker_dir(&root, "keep/archive-three");

    let found = locate(vec![root.clone()], 0, 3, &["archive"]);
    assert_eq!(found, vec![root.join("keep/one")]);
}

#[test]
fn git_files_count_as_markers() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    fs::create_dir_all(root.join("worktree")).unwrap();
    fs::write(root.join("worktree/.git"), "gitdir: /elsewhere\n").unwrap();

    assert_eq!(locate(vec![root.clone()], 0, 1, &[]), vec![root.join("worktree")]);
}

#[test]
fn results_are_sorted_and_deduplicated_across_roots() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    marker_dir(&root, "zeta");
    marker_dir(&root, "alpha");
    marker_dir(&root, "mid");

    let found = locate(vec![root.clone(), root.clone()], 1, 1, &[]);
    assert_eq!(found, vec![root.join("alpha"), root.join("mid"), root.join("zeta")]);
}

#[test]
fn missing_roots_are_skipped() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    marker_dir(&root, "present");

    let found = locate(vec![root.join("does-not-exist"), root.clone()], 0, 1, &[]);
    assert_eq!(found, vec![root.join("present")]);
}

#[test]
fn root_that_is_a_repository_is_taken_as_is() {
    if !common::has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap().join("project");
    common::init_git_repo(&root);
    marker_dir(&root, "vendor/nested");

    assert_eq!(locate(vec![root.clone()], 2, 3, &[]), vec![root]);
}
