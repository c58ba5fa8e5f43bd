use crate::analyzer::Analyzer;
use crate::config::{AnalyzerConfig, RepositoryConfig};
use crate::git::Git;
use crate::model::RepositoryRef;
use console::style;
use ignore::WalkBuilder;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn, Dispatch};

pub const REPOSITORY_MARKER: &str = ".git";

/// Finds repositories under the configured roots within the depth bounds.
pub struct RepositoryLocator<'a> {
    git: &'a Git,
    config: &'a RepositoryConfig,
}

impl<'a> RepositoryLocator<'a> {
    pub fn new(git: &'a Git, config: &'a RepositoryConfig) -> Self {
        Self { git, config }
    }

    /// Sorted, deduplicated repository paths. Missing roots and unreadable subtrees are skipped.
    pub fn locate(&self) -> Vec<RepositoryRef> {
        let mut found: Vec<PathBuf> = Vec::new();

        for root in &self.config.roots {
            info!("Searching in base path: {}", root.display());
            if !root.exists() {
                warn!("Base path does not exist: {}", root.display());
                continue;
            }
            let root = std::fs::canonicalize(root).unwrap_or_else(|_| root.clone());

            if self.git.is_repository(&root) {
                if self.is_excluded(&root) {
                    debug!("Skipping excluded base path: {}", root.display());
                } else {
                    info!("Found Git repository at base path: {}", root.display());
                    found.push(root);
                }
                continue;
            }

            found.extend(self.search(&root));
        }

        found.sort();
        found.dedup();
        found.into_iter().map(RepositoryRef::new).collect()
    }

    fn search(&self, root: &Path) -> Vec<PathBuf> {
        let mut found = Vec::new();

        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .max_depth(Some(self.config.max_depth + 1))
            .filter_entry(|entry| {
                entry.path().parent().and_then(Path::file_name) != Some(OsStr::new(REPOSITORY_MARKER))
            })
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry under {}: {e}", root.display());
                    continue;
                }
            };
            if entry.file_name() != OsStr::new(REPOSITORY_MARKER) {
                continue;
            }
            let Some(repo_path) = entry.path().parent() else {
                continue;
            };
            if let Some(repo_path) = self.accept(root, repo_path) {
                info!("Found Git repository: {}", repo_path.display());
                found.push(repo_path);
            }
        }

        found
    }

    fn accept(&self, root: &Path, repo_path: &Path) -> Option<PathBuf> {
        let depth = repository_depth(root, repo_path)?;
        if depth < self.config.min_depth || depth > self.config.max_depth {
            debug!("Skipping {} due to depth {depth}", repo_path.display());
            return None;
        }

        if self.is_excluded(repo_path) {
            debug!("Skipping excluded path: {}", repo_path.display());
            return None;
        }

        Some(repo_path.to_path_buf())
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let as_string = path.to_string_lossy();
        self.config
            .excluded_paths
            .iter()
            .any(|excluded| as_string.contains(excluded.as_str()))
    }
}

/// Number of path segments between `root` and `repo_path`.
pub fn repository_depth(root: &Path, repo_path: &Path) -> Option<usize> {
    repo_path.strip_prefix(root).ok().map(|rel| rel.components().count())
}

pub fn exec(config: AnalyzerConfig, dispatch: Dispatch, json: bool) -> anyhow::Result<()> {
    let analyzer = Analyzer::new(config, dispatch);
    let repositories = analyzer.discover();

    if json {
        println!("{}", serde_json::to_string_pretty(&repositories)?);
        return Ok(());
    }

    if repositories.is_empty() {
        println!("No repositories found");
        return Ok(());
    }
    for repo in &repositories {
        let status = if repo.is_repository {
            style("Valid Git Repository").green()
        } else {
            style("Not a Git Repository").red()
        };
        println!("{} ({})", repo.path.display(), status);
    }
    Ok(())
}
