use crate::error::{ContribError, Result};
use crate::model::DateWindow;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const MIN_GRAPH_WIDTH: u32 = 200;
pub const MIN_GRAPH_HEIGHT: u32 = 150;
const DEFAULT_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryConfig {
    pub roots: Vec<PathBuf>,
    pub excluded_paths: Vec<String>,
    pub min_depth: usize,
    pub max_depth: usize,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            excluded_paths: Vec::new(),
            min_depth: 0,
            max_depth: 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorConfig {
    pub aliases: BTreeMap<String, String>,
    pub excluded: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub top_n_contributors: usize,
    pub graph_width: u32,
    pub graph_height: u32,
    pub graph_title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("reports"),
            top_n_contributors: 20,
            graph_width: 1500,
            graph_height: 800,
            graph_title: "Monthly Contribution Activity by Top Contributors".to_string(),
        }
    }
}

/// How per-commit line statistics are obtained from git.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StatsMode {
    /// One `git log --numstat` per repository
    #[default]
    Batched,
    /// One `git show --numstat` per commit
    PerCommit,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitConfig {
    pub program: String,
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    pub stats_mode: StatsMode,
    pub include_merges: bool,
    pub jobs: Option<usize>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
            timeout: Duration::from_secs(60),
            stats_mode: StatsMode::default(),
            include_merges: true,
            jobs: None,
        }
    }
}

impl GitConfig {
    pub fn jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

/// Configuration as written in a JSON file, before dates are resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub since: Option<String>,
    pub until: Option<String>,
    pub repositories: RepositoryConfig,
    pub authors: AuthorConfig,
    pub report: ReportConfig,
    pub git: GitConfig,
}

impl FileConfig {
    /// Read a JSON config file. Relative repository roots resolve against the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let mut config: FileConfig = serde_json::from_str(&raw)?;
        if let Some(base) = path.parent() {
            for root in config.repositories.roots.iter_mut() {
                if root.is_relative() {
                    *root = base.join(&*root);
                }
            }
        }
        Ok(config)
    }

    pub fn resolve(self, today: NaiveDate) -> Result<AnalyzerConfig> {
        let until = match self.until.as_deref() {
            Some(u) => parse_date(u, today)?,
            None => today,
        };
        let since = match self.since.as_deref() {
            Some(s) => parse_date(s, today)?,
            None => until - ChronoDuration::days(DEFAULT_WINDOW_DAYS),
        };
        let config = AnalyzerConfig {
            window: DateWindow::new(since, until)?,
            repositories: self.repositories,
            authors: self.authors,
            report: self.report,
            git: self.git,
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub window: DateWindow,
    pub repositories: RepositoryConfig,
    pub authors: AuthorConfig,
    pub report: ReportConfig,
    pub git: GitConfig,
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<()> {
        let repos = &self.repositories;
        if repos.min_depth > repos.max_depth {
            return Err(ContribError::Config(format!(
                "min_depth ({}) is greater than max_depth ({})",
                repos.min_depth, repos.max_depth
            )));
        }
        if self.report.graph_width < MIN_GRAPH_WIDTH || self.report.graph_height < MIN_GRAPH_HEIGHT {
            return Err(ContribError::Config(format!(
                "graph must be at least {MIN_GRAPH_WIDTH}x{MIN_GRAPH_HEIGHT} pixels, got {}x{}",
                self.report.graph_width, self.report.graph_height
            )));
        }
        if self.git.jobs == Some(0) {
            return Err(ContribError::Config("jobs must be at least 1".to_string()));
        }
        if self.git.timeout.is_zero() {
            return Err(ContribError::Config("git timeout must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Parse a calendar date: `YYYY-MM-DD`, RFC3339, or `N days|weeks|months ago` relative to `today`.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.date_naive());
    }

    if let Some(days) = parse_relative_days(trimmed) {
        return today
            .checked_sub_signed(ChronoDuration::days(days))
            .ok_or_else(|| ContribError::InvalidDate(format!("Duration overflow for '{input}'")));
    }

    Err(ContribError::InvalidDate(format!(
        "'{input}' is not YYYY-MM-DD, RFC3339, or 'N days/weeks/months ago'"
    )))
}

fn parse_relative_days(input: &str) -> Option<i64> {
    let input = input.to_lowercase();

    for (suffix, factor) in [
        (" days ago", 1),
        (" day ago", 1),
        (" weeks ago", 7),
        (" week ago", 7),
        (" months ago", 30),
        (" month ago", 30),
    ] {
        if let Some(n) = input.strip_suffix(suffix) {
            if let Ok(n) = n.trim().parse::<i64>() {
                return n.checked_mul(factor);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_supported_date_forms() {
        let today = day(2024, 3, 31);
        assert_eq!(parse_date("2024-01-05", today).unwrap(), day(2024, 1, 5));
        assert_eq!(parse_date("2024-01-05T23:10:00+02:00", today).unwrap(), day(2024, 1, 5));
        assert_eq!(parse_date("10 days ago", today).unwrap(), day(2024, 3, 21));
        assert_eq!(parse_date("2 weeks ago", today).unwrap(), day(2024, 3, 17));
        assert_eq!(parse_date("1 month ago", today).unwrap(), day(2024, 3, 1));
        assert!(parse_date("last tuesday", today).is_err());
    }

    #[test]
    fn resolve_defaults_to_one_year_window() {
        let config = FileConfig::default().resolve(day(2024, 12, 31)).unwrap();
        assert_eq!(config.window.until, day(2024, 12, 31));
        assert_eq!(config.window.since, day(2024, 1, 1));
        assert_eq!(config.repositories.max_depth, 1);
    }

    #[test]
    fn rejects_inverted_depth_bounds() {
        let mut file = FileConfig::default();
        file.repositories.min_depth = 3;
        file.repositories.max_depth = 2;
        assert!(matches!(file.resolve(day(2024, 1, 1)), Err(ContribError::Config(_))));
    }

    #[test]
    fn rejects_inverted_window() {
        let file = FileConfig {
            since: Some("2024-02-01".into()),
            until: Some("2024-01-01".into()),
            ..Default::default()
        };
        assert!(matches!(file.resolve(day(2024, 3, 1)), Err(ContribError::InvalidDate(_))));
    }

    #[test]
    fn file_config_parses_json() {
        let json = r#"{
            "since": "2024-01-01",
            "repositories": { "roots": ["/srv/src"], "max_depth": 3 },
            "authors": { "aliases": { "Alice": "alice.smith" }, "excluded": ["ci"] },
            "git": { "timeout": "2m", "stats_mode": "per-commit" }
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.repositories.max_depth, 3);
        assert_eq!(config.repositories.min_depth, 0);
        assert_eq!(config.git.timeout, Duration::from_secs(120));
        assert_eq!(config.git.stats_mode, StatsMode::PerCommit);
        assert!(config.git.include_merges);
        assert_eq!(config.report.top_n_contributors, 20);
    }
}
