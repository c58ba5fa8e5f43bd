use crate::model::{
    AuthorCommits, AuthorSummaryRow, CommitRecord, DailyActivityRow, MonthActivity, MonthlyDetail,
    RepositoryActivity, RepositorySummaryRow, TrendMatrix,
};
use crate::util::{month_key, month_span, top_k};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

pub const MONTH_TOP_AUTHORS: usize = 3;
pub const REPOSITORY_TOP_AUTHORS: usize = 2;
pub const REPORT_TOP_AUTHORS: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    commits: u64,
    additions: u64,
    deletions: u64,
}

impl Tally {
    fn add(&mut self, record: &CommitRecord) {
        self.commits += 1;
        self.additions += record.additions;
        self.deletions += record.deletions;
    }
}

/// Every report view, derived from one dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateViews {
    pub author_summary: Vec<AuthorSummaryRow>,
    pub daily_activity: Vec<DailyActivityRow>,
    pub repository_summary: Vec<RepositorySummaryRow>,
    pub monthly: MonthlyDetail,
}

impl AggregateViews {
    pub fn from_dataset(dataset: &[CommitRecord]) -> Self {
        Self {
            author_summary: author_summary(dataset),
            daily_activity: daily_activity(dataset),
            repository_summary: repository_summary(dataset),
            monthly: monthly_detail(dataset),
        }
    }
}

/// One row per author, most commits first, ties by author name.
pub fn author_summary(dataset: &[CommitRecord]) -> Vec<AuthorSummaryRow> {
    let mut by_author: BTreeMap<&str, Tally> = BTreeMap::new();
    for record in dataset {
        by_author.entry(record.author.as_str()).or_default().add(record);
    }

    let mut rows: Vec<AuthorSummaryRow> = by_author
        .into_iter()
        .map(|(author, t)| AuthorSummaryRow {
            author: author.to_string(),
            commits: t.commits,
            additions: t.additions,
            deletions: t.deletions,
            total_lines: t.additions + t.deletions,
        })
        .collect();

    rows.sort_by(|a, b| b.commits.cmp(&a.commits).then_with(|| a.author.cmp(&b.author)));
    rows
}

/// One row per (date, author): dates ascending, then most commits first, ties by author name.
pub fn daily_activity(dataset: &[CommitRecord]) -> Vec<DailyActivityRow> {
    let mut by_day: BTreeMap<(NaiveDate, &str), Tally> = BTreeMap::new();
    for record in dataset {
        by_day
            .entry((record.date, record.author.as_str()))
            .or_default()
            .add(record);
    }

    let mut rows: Vec<DailyActivityRow> = by_day
        .into_iter()
        .map(|((date, author), t)| DailyActivityRow {
            date,
            author: author.to_string(),
            commits: t.commits,
            additions: t.additions,
            deletions: t.deletions,
        })
        .collect();

    rows.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| b.commits.cmp(&a.commits))
            .then_with(|| a.author.cmp(&b.author))
    });
    rows
}

/// One row per (repository, author). Repositories are ordered by their total commits (descending,
/// ties by name) and each repository's authors by commits (descending, ties by name).
pub fn repository_summary(dataset: &[CommitRecord]) -> Vec<RepositorySummaryRow> {
    let mut by_pair: BTreeMap<(&str, &str), Tally> = BTreeMap::new();
    let mut repo_totals: HashMap<&str, u64> = HashMap::new();
    for record in dataset {
        by_pair
            .entry((record.repository.as_str(), record.author.as_str()))
            .or_default()
            .add(record);
        *repo_totals.entry(record.repository.as_str()).or_insert(0) += 1;
    }

    let mut rows: Vec<(u64, RepositorySummaryRow)> = by_pair
        .into_iter()
        .map(|((repository, author), t)| {
            (
                repo_totals[repository],
                RepositorySummaryRow {
                    repository: repository.to_string(),
                    author: author.to_string(),
                    commits: t.commits,
                    additions: t.additions,
                    deletions: t.deletions,
                },
            )
        })
        .collect();

    rows.sort_by(|(total_a, a), (total_b, b)| {
        total_b
            .cmp(total_a)
            .then_with(|| a.repository.cmp(&b.repository))
            .then_with(|| b.commits.cmp(&a.commits))
            .then_with(|| a.author.cmp(&b.author))
    });
    rows.into_iter().map(|(_, row)| row).collect()
}

fn by_commits_desc(a: &AuthorCommits, b: &AuthorCommits) -> Ordering {
    b.commits.cmp(&a.commits).then_with(|| a.author.cmp(&b.author))
}

fn ranked_authors(counts: BTreeMap<&str, u64>, k: usize) -> Vec<AuthorCommits> {
    let all: Vec<AuthorCommits> = counts
        .into_iter()
        .map(|(author, commits)| AuthorCommits {
            author: author.to_string(),
            commits,
        })
        .collect();
    top_k(all, k, by_commits_desc)
}

/// Months ascending with their top authors, and repositories by activity with their top authors.
pub fn monthly_detail(dataset: &[CommitRecord]) -> MonthlyDetail {
    let mut months: BTreeMap<String, BTreeMap<&str, u64>> = BTreeMap::new();
    let mut repositories: BTreeMap<&str, BTreeMap<&str, u64>> = BTreeMap::new();

    for record in dataset {
        *months
            .entry(month_key(&record.date))
            .or_default()
            .entry(record.author.as_str())
            .or_insert(0) += 1;
        *repositories
            .entry(record.repository.as_str())
            .or_default()
            .entry(record.author.as_str())
            .or_insert(0) += 1;
    }

    let months = months
        .into_iter()
        .map(|(month, authors)| MonthActivity {
            month,
            commits: authors.values().sum(),
            top_authors: ranked_authors(authors, MONTH_TOP_AUTHORS),
        })
        .collect();

    let mut repositories: Vec<RepositoryActivity> = repositories
        .into_iter()
        .map(|(repository, authors)| RepositoryActivity {
            repository: repository.to_string(),
            commits: authors.values().sum(),
            top_authors: ranked_authors(authors, REPOSITORY_TOP_AUTHORS),
        })
        .collect();
    repositories.sort_by(|a, b| b.commits.cmp(&a.commits).then_with(|| a.repository.cmp(&b.repository)));

    MonthlyDetail { months, repositories }
}

/// Monthly commit counts for the `top_n` most active authors, with every month between the
/// earliest and latest commit present for every author.
pub fn trend_matrix(dataset: &[CommitRecord], top_n: usize) -> TrendMatrix {
    let (Some(first), Some(last)) = (
        dataset.iter().map(|r| r.date).min(),
        dataset.iter().map(|r| r.date).max(),
    ) else {
        return TrendMatrix::default();
    };

    let months = month_span(&first, &last);
    let authors: Vec<String> = author_summary(dataset)
        .into_iter()
        .take(top_n)
        .map(|row| row.author)
        .collect();

    let month_index: HashMap<&str, usize> = months
        .iter()
        .enumerate()
        .map(|(i, m)| (m.as_str(), i))
        .collect();
    let author_index: HashMap<&str, usize> = authors
        .iter()
        .enumerate()
        .map(|(i, a)| (a.as_str(), i))
        .collect();

    let mut counts = vec![vec![0u64; months.len()]; authors.len()];
    for record in dataset {
        let Some(&a) = author_index.get(record.author.as_str()) else {
            continue;
        };
        if let Some(&m) = month_index.get(month_key(&record.date).as_str()) {
            counts[a][m] += 1;
        }
    }

    TrendMatrix {
        months,
        authors,
        counts,
    }
}
