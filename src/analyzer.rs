use crate::aggregate::AggregateViews;
use crate::authors::AuthorNormalizer;
use crate::config::AnalyzerConfig;
use crate::discover::RepositoryLocator;
use crate::error::{ContribError, Result};
use crate::git::{CommitExtractor, Git};
use crate::model::{CommitRecord, DiscoveredRepository, RepositoryRef};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{dispatcher, error, info, Dispatch};

/// Outcome of one repository's extraction.
enum RepositoryOutcome {
    NotRepository,
    Empty,
    Records(Vec<CommitRecord>),
    Failed,
}

/// The combined dataset of one run plus everything derived from it.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub dataset: Vec<CommitRecord>,
    pub views: AggregateViews,
    pub repositories_scanned: usize,
    pub repositories_with_data: usize,
    pub repositories_failed: usize,
}

/// Runs discovery, extraction, and aggregation. Logging goes to the dispatch handed in at
/// construction, on the calling thread and on every worker.
pub struct Analyzer {
    config: AnalyzerConfig,
    git: Git,
    normalizer: AuthorNormalizer,
    dispatch: Dispatch,
    show_progress: bool,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig, dispatch: Dispatch) -> Self {
        let git = Git::new(config.git.program.clone(), config.git.timeout);
        let normalizer = AuthorNormalizer::new(&config.authors);
        Self {
            config,
            git,
            normalizer,
            dispatch,
            show_progress: true,
        }
    }

    pub fn show_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Repository discovery only, with each candidate's repository status.
    pub fn discover(&self) -> Vec<DiscoveredRepository> {
        dispatcher::with_default(&self.dispatch, || {
            RepositoryLocator::new(&self.git, &self.config.repositories)
                .locate()
                .into_iter()
                .map(|repo| DiscoveredRepository {
                    is_repository: self.git.is_repository(repo.path()),
                    path: repo.path,
                    name: repo.name,
                })
                .collect()
        })
    }

    pub fn run(&self) -> Result<Analysis> {
        dispatcher::with_default(&self.dispatch, || self.run_scoped())
    }

    fn run_scoped(&self) -> Result<Analysis> {
        let window = self.config.window;
        info!(
            "Analyzing repositories for commits between {} and {}",
            window.since.format("%Y-%m-%d"),
            window.until.format("%Y-%m-%d")
        );

        let repositories = RepositoryLocator::new(&self.git, &self.config.repositories).locate();
        if repositories.is_empty() {
            info!("No repositories found under the configured roots");
            return Err(ContribError::NoData);
        }

        info!("Gathering statistics from {} repositories", repositories.len());
        let outcomes = self.extract_all(&repositories)?;

        let mut dataset = Vec::new();
        let mut with_data = 0;
        let mut failed = 0;
        for (repo, outcome) in repositories.iter().zip(outcomes) {
            match outcome {
                RepositoryOutcome::Records(records) => {
                    with_data += 1;
                    dataset.extend(records);
                }
                RepositoryOutcome::Failed => failed += 1,
                RepositoryOutcome::NotRepository | RepositoryOutcome::Empty => {
                    info!("No commits found in {}", repo.name);
                }
            }
        }

        if dataset.is_empty() {
            error!("No data found in any repository.");
            return Err(ContribError::NoData);
        }

        info!(
            "Collected {} commits from {} of {} repositories",
            dataset.len(),
            with_data,
            repositories.len()
        );

        let views = AggregateViews::from_dataset(&dataset);
        Ok(Analysis {
            dataset,
            views,
            repositories_scanned: repositories.len(),
            repositories_with_data: with_data,
            repositories_failed: failed,
        })
    }

    fn extract_all(&self, repositories: &[RepositoryRef]) -> Result<Vec<RepositoryOutcome>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.git.jobs())
            .build()
            .map_err(|e| ContribError::Config(format!("Failed to start worker pool: {e}")))?;

        let pb = if self.show_progress {
            ProgressBar::new(repositories.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} repositories {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let extractor = CommitExtractor::new(&self.git, self.config.window, &self.normalizer)
            .stats_mode(self.config.git.stats_mode)
            .include_merges(self.config.git.include_merges);

        let outcomes: Vec<RepositoryOutcome> = pool.install(|| {
            repositories
                .par_iter()
                .progress_with(pb.clone())
                .map(|repo| dispatcher::with_default(&self.dispatch, || self.extract_one(&extractor, repo)))
                .collect()
        });

        pb.finish_and_clear();
        Ok(outcomes)
    }

    fn extract_one(&self, extractor: &CommitExtractor<'_>, repo: &RepositoryRef) -> RepositoryOutcome {
        if !self.git.is_repository(repo.path()) {
            info!("Not a git repository: {}", repo.path().display());
            return RepositoryOutcome::NotRepository;
        }

        match extractor.extract(repo) {
            Ok(records) if records.is_empty() => RepositoryOutcome::Empty,
            Ok(records) => {
                info!("Successfully analyzed {} ({} commits)", repo.name, records.len());
                RepositoryOutcome::Records(records)
            }
            Err(e) => {
                error!("Error getting stats for {}: {e}", repo.path().display());
                RepositoryOutcome::Failed
            }
        }
    }
}
