use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;

/// A discovered repository: its absolute path plus the short name used in reports.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RepositoryRef {
    pub path: PathBuf,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One commit found inside the analysis window, after author normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub hash: String,
    pub date: NaiveDate,
    pub author: String,
    pub repository: String,
    pub additions: u64,
    pub deletions: u64,
}

/// Inclusive calendar-day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub since: NaiveDate,
    pub until: NaiveDate,
}

impl DateWindow {
    pub fn new(since: NaiveDate, until: NaiveDate) -> crate::error::Result<Self> {
        if since > until {
            return Err(crate::error::ContribError::InvalidDate(format!(
                "Invalid range: since ({since}) is after until ({until})"
            )));
        }
        Ok(Self { since, until })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummaryRow {
    pub author: String,
    pub commits: u64,
    pub additions: u64,
    pub deletions: u64,
    pub total_lines: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivityRow {
    pub date: NaiveDate,
    pub author: String,
    pub commits: u64,
    pub additions: u64,
    pub deletions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummaryRow {
    pub repository: String,
    pub author: String,
    pub commits: u64,
    pub additions: u64,
    pub deletions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorCommits {
    pub author: String,
    pub commits: u64,
}

/// Commit activity for one calendar month, keyed `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthActivity {
    pub month: String,
    pub commits: u64,
    pub top_authors: Vec<AuthorCommits>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryActivity {
    pub repository: String,
    pub commits: u64,
    pub top_authors: Vec<AuthorCommits>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyDetail {
    pub months: Vec<MonthActivity>,
    pub repositories: Vec<RepositoryActivity>,
}

/// Author × month commit counts for the trend chart. `counts[a][m]` is the
/// number of commits by `authors[a]` in `months[m]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendMatrix {
    pub months: Vec<String>,
    pub authors: Vec<String>,
    pub counts: Vec<Vec<u64>>,
}

impl TrendMatrix {
    pub fn is_empty(&self) -> bool {
        self.months.is_empty() || self.authors.is_empty()
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub since: NaiveDate,
    pub until: NaiveDate,
    pub repositories_scanned: usize,
    pub repositories_with_data: usize,
    pub author_summary: Vec<AuthorSummaryRow>,
    pub daily_activity: Vec<DailyActivityRow>,
    pub repository_summary: Vec<RepositorySummaryRow>,
    pub monthly: MonthlyDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredRepository {
    pub path: PathBuf,
    pub name: String,
    pub is_repository: bool,
}
