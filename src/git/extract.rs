use super::command::Git;
use super::parse::{self, DiffStat, LogEntry};
use crate::authors::AuthorNormalizer;
use crate::config::StatsMode;
use crate::error::Result;
use crate::model::{CommitRecord, DateWindow, RepositoryRef};
use tracing::{debug, error, warn};

/// Pulls commit metadata and line statistics for one repository at a time.
pub struct CommitExtractor<'a> {
    git: &'a Git,
    window: DateWindow,
    normalizer: &'a AuthorNormalizer,
    mode: StatsMode,
    include_merges: bool,
}

impl<'a> CommitExtractor<'a> {
    pub fn new(git: &'a Git, window: DateWindow, normalizer: &'a AuthorNormalizer) -> Self {
        Self {
            git,
            window,
            normalizer,
            mode: StatsMode::default(),
            include_merges: true,
        }
    }

    pub fn stats_mode(mut self, mode: StatsMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn include_merges(mut self, include_merges: bool) -> Self {
        self.include_merges = include_merges;
        self
    }

    fn log_args(&self, format: &'static str) -> Vec<String> {
        let mut args = vec![
            "log".to_string(),
            format!("--since={} 00:00:00", self.window.since.format("%Y-%m-%d")),
            format!("--until={} 23:59:59", self.window.until.format("%Y-%m-%d")),
            format.to_string(),
            "--date=short".to_string(),
        ];
        if !self.include_merges {
            args.push("--no-merges".to_string());
        }
        args
    }

    /// All records for `repo` inside the window. Fails only when the commit listing itself fails;
    /// per-commit problems drop that commit and are logged.
    pub fn extract(&self, repo: &RepositoryRef) -> Result<Vec<CommitRecord>> {
        let records = match self.mode {
            StatsMode::Batched => self.extract_batched(repo)?,
            StatsMode::PerCommit => self.extract_per_commit(repo)?,
        };
        debug!("{}: {} commits in window", repo.name, records.len());
        Ok(records)
    }

    fn extract_batched(&self, repo: &RepositoryRef) -> Result<Vec<CommitRecord>> {
        let mut args = self.log_args(parse::BATCHED_LOG_FORMAT);
        args.push("--numstat".to_string());
        args.push(parse::MERGE_DIFF.to_string());
        let output = self.run(repo, &args)?;

        Ok(parse::parse_batched_log(&output)
            .into_iter()
            .filter_map(|(entry, stat)| {
                let author = self.normalizer.normalize(&entry.author)?;
                Some(record(repo, entry, author, stat))
            })
            .collect())
    }

    fn extract_per_commit(&self, repo: &RepositoryRef) -> Result<Vec<CommitRecord>> {
        let output = self.run(repo, &self.log_args(parse::LOG_FORMAT))?;

        let mut records = Vec::new();
        for line in output.lines().filter(|l| !l.trim().is_empty()) {
            let entry = match parse::parse_log_line(line) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("{}: skipping commit line: {e}", repo.name);
                    continue;
                }
            };

            let Some(author) = self.normalizer.normalize(&entry.author) else {
                continue;
            };

            let numstat = self.run(
                repo,
                &["show", "--numstat", parse::MERGE_DIFF, "--format=", entry.hash.as_str()],
            );
            match numstat {
                Ok(output) => {
                    let stat = parse::sum_numstat(&output);
                    records.push(record(repo, entry, author, stat));
                }
                Err(e) => error!("{}: no stats for commit {}: {e}", repo.name, entry.hash),
            }
        }
        Ok(records)
    }

    fn run<S: AsRef<str>>(&self, repo: &RepositoryRef, args: &[S]) -> Result<String> {
        let args: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();
        self.git.run(repo.path(), &args)
    }
}

fn record(repo: &RepositoryRef, entry: LogEntry, author: String, stat: DiffStat) -> CommitRecord {
    CommitRecord {
        hash: entry.hash,
        date: entry.date,
        author,
        repository: repo.name.clone(),
        additions: stat.additions,
        deletions: stat.deletions,
    }
}
