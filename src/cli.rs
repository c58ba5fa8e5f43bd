use crate::config::{AnalyzerConfig, FileConfig, StatsMode};
use anyhow::{Context, Result};
use chrono::Local;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "gitcontrib")]
#[command(about = "Contribution reports across many git repositories: authors, days, repositories, months")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, global = true, action = ArgAction::Count, help = "More log output (repeatable)")]
    pub verbose: u8,

    #[arg(short, long, global = true, help = "Only log errors")]
    pub quiet: bool,

    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Default)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "Path to a JSON configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long = "root", global = true, help = "Directory to search for repositories (repeatable)")]
    pub roots: Vec<PathBuf>,

    #[arg(long = "exclude-path", global = true, help = "Skip repositories whose path contains this text (repeatable)")]
    pub exclude_paths: Vec<String>,

    #[arg(long, global = true, help = "Minimum repository depth below a root")]
    pub min_depth: Option<usize>,

    #[arg(long, global = true, help = "Maximum repository depth below a root")]
    pub max_depth: Option<usize>,

    #[arg(long, global = true, help = "First day of the window (YYYY-MM-DD, RFC3339, or 'N days ago')")]
    pub since: Option<String>,

    #[arg(long, global = true, help = "Last day of the window (YYYY-MM-DD, RFC3339, or 'N days ago')")]
    pub until: Option<String>,

    #[arg(long = "alias", global = true, value_parser = parse_alias, help = "Map an author onto a canonical name: raw=canonical (repeatable)")]
    pub aliases: Vec<(String, String)>,

    #[arg(long = "exclude-author", global = true, help = "Drop commits by this author (repeatable)")]
    pub exclude_authors: Vec<String>,

    #[arg(long, global = true, help = "Directory for report files")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Number of authors plotted in the trend chart")]
    pub top_n: Option<usize>,

    #[arg(long, global = true, help = "Chart width in pixels")]
    pub graph_width: Option<u32>,

    #[arg(long, global = true, help = "Chart height in pixels")]
    pub graph_height: Option<u32>,

    #[arg(long, global = true, value_parser = humantime::parse_duration, help = "Bound on each git invocation, e.g. 30s or 2m")]
    pub git_timeout: Option<Duration>,

    #[arg(long, global = true, value_enum, help = "How line statistics are collected")]
    pub stats_mode: Option<StatsMode>,

    #[arg(long, global = true, help = "Leave merge commits out")]
    pub no_merges: bool,

    #[arg(short, long, global = true, help = "Repositories scanned in parallel")]
    pub jobs: Option<usize>,
}

fn parse_alias(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((from, to)) if !from.trim().is_empty() && !to.trim().is_empty() => {
            Ok((from.trim().to_string(), to.trim().to_string()))
        }
        _ => Err(format!("expected raw=canonical, got '{raw}'")),
    }
}

impl CommonArgs {
    /// The config file (if any) with command-line values layered on top.
    pub fn to_config(&self) -> Result<AnalyzerConfig> {
        let mut file = match &self.config {
            Some(path) => FileConfig::load(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?,
            None => FileConfig::default(),
        };

        if self.since.is_some() {
            file.since = self.since.clone();
        }
        if self.until.is_some() {
            file.until = self.until.clone();
        }

        let repos = &mut file.repositories;
        repos.roots.extend(self.roots.iter().cloned());
        if repos.roots.is_empty() {
            repos.roots.push(std::env::current_dir()?);
        }
        repos.excluded_paths.extend(self.exclude_paths.iter().cloned());
        if let Some(d) = self.min_depth {
            repos.min_depth = d;
        }
        if let Some(d) = self.max_depth {
            repos.max_depth = d;
        }

        file.authors.aliases.extend(self.aliases.iter().cloned());
        file.authors.excluded.extend(self.exclude_authors.iter().cloned());

        let report = &mut file.report;
        if let Some(dir) = &self.output_dir {
            report.output_dir = dir.clone();
        }
        if let Some(n) = self.top_n {
            report.top_n_contributors = n;
        }
        if let Some(w) = self.graph_width {
            report.graph_width = w;
        }
        if let Some(h) = self.graph_height {
            report.graph_height = h;
        }

        let git = &mut file.git;
        if let Some(t) = self.git_timeout {
            git.timeout = t;
        }
        if let Some(mode) = self.stats_mode {
            git.stats_mode = mode;
        }
        if self.no_merges {
            git.include_merges = false;
        }
        if self.jobs.is_some() {
            git.jobs = self.jobs;
        }

        let today = Local::now().date_naive();
        Ok(file.resolve(today)?)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the CSV tables, the detailed report, and the trend chart
    Report {
        #[arg(long, help = "Print the aggregated views as JSON")]
        json: bool,

        #[arg(long, help = "Skip the trend chart")]
        no_chart: bool,
    },
    /// Print the author summary without writing files
    Authors {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,
    },
    /// List the repositories that would be analyzed
    Discover {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        let dispatch = crate::logging::dispatch(self.quiet, self.verbose)?;
        let config = self.common.to_config().context("Invalid configuration")?;

        match self.command {
            Commands::Report { json, no_chart } => crate::report::exec(config, dispatch, self.quiet, json, !no_chart),
            Commands::Authors { json, ndjson } => crate::summary::exec(config, dispatch, self.quiet, json, ndjson),
            Commands::Discover { json } => crate::discover::exec(config, dispatch, json),
        }
    }
}
