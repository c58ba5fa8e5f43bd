use crate::aggregate::{trend_matrix, AggregateViews, REPORT_TOP_AUTHORS};
use crate::analyzer::{Analysis, Analyzer};
use crate::chart::render_trend_chart;
use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::model::{
    AuthorSummaryRow, CommitRecord, DailyActivityRow, ReportOutput, RepositorySummaryRow, SCHEMA_VERSION,
};
use crate::util::group_thousands;
use anyhow::Context;
use chrono::{NaiveDate, Utc};
use console::style;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{dispatcher, info, Dispatch};

pub fn exec(config: AnalyzerConfig, dispatch: Dispatch, quiet: bool, json: bool, chart: bool) -> anyhow::Result<()> {
    let analyzer = Analyzer::new(config, dispatch.clone()).show_progress(!(quiet || json));
    let analysis = analyzer.run().context("Analysis failed")?;
    let config = analyzer.config();

    let paths = ReportPaths::for_dataset(&config.report.output_dir, &analysis.dataset)
        .context("Analysis produced no commits")?;

    dispatcher::with_default(&dispatch, || -> anyhow::Result<()> {
        info!("Generating reports in {}", config.report.output_dir.display());
        write_reports(&analysis.views, &paths).context("Failed to write reports")?;
        if chart {
            let matrix = trend_matrix(&analysis.dataset, config.report.top_n_contributors);
            render_trend_chart(&matrix, &config.report, &paths.contribution_graph)
                .context("Failed to render contribution graph")?;
        }
        Ok(())
    })?;

    if json {
        output_json(&analysis, config)?;
    } else {
        output_summary(&analysis, &paths, chart);
    }

    Ok(())
}

pub fn report_output(analysis: &Analysis, config: &AnalyzerConfig) -> ReportOutput {
    ReportOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        since: config.window.since,
        until: config.window.until,
        repositories_scanned: analysis.repositories_scanned,
        repositories_with_data: analysis.repositories_with_data,
        author_summary: analysis.views.author_summary.clone(),
        daily_activity: analysis.views.daily_activity.clone(),
        repository_summary: analysis.views.repository_summary.clone(),
        monthly: analysis.views.monthly.clone(),
    }
}

fn output_json(analysis: &Analysis, config: &AnalyzerConfig) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&report_output(analysis, config))?);
    Ok(())
}

fn output_summary(analysis: &Analysis, paths: &ReportPaths, chart: bool) {
    println!("{}", style("Contribution Report").bold());
    println!("{}", "─".repeat(50));
    println!(
        "Repositories: {} scanned, {} with commits, {} failed",
        style(analysis.repositories_scanned).cyan(),
        style(analysis.repositories_with_data).green(),
        style(analysis.repositories_failed).red()
    );
    println!("Commits: {}", style(group_thousands(analysis.dataset.len() as u64)).cyan());
    println!();

    crate::summary::output_table(&analysis.views.author_summary, REPORT_TOP_AUTHORS);

    println!("\n{}", style("Files").bold());
    for path in [
        &paths.author_summary,
        &paths.daily_activity,
        &paths.repository_summary,
        &paths.detailed_report,
    ] {
        println!("  {}", path.display());
    }
    if chart {
        println!("  {}", paths.contribution_graph.display());
    }
}

/// Output file locations for one run, stamped with the dataset's first and last commit dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub author_summary: PathBuf,
    pub daily_activity: PathBuf,
    pub repository_summary: PathBuf,
    pub detailed_report: PathBuf,
    pub contribution_graph: PathBuf,
}

impl ReportPaths {
    pub fn new(output_dir: &Path, first: NaiveDate, last: NaiveDate) -> Self {
        let stamp = format!("{}_{}", first.format("%Y%m%d"), last.format("%Y%m%d"));
        let file = |kind: &str, ext: &str| output_dir.join(format!("git_commits_{kind}_{stamp}.{ext}"));
        Self {
            author_summary: file("author_summary", "csv"),
            daily_activity: file("daily_activity", "csv"),
            repository_summary: file("repository_summary", "csv"),
            detailed_report: file("detailed_report", "txt"),
            contribution_graph: file("contribution_graph", "png"),
        }
    }

    /// `None` for an empty dataset.
    pub fn for_dataset(output_dir: &Path, dataset: &[CommitRecord]) -> Option<Self> {
        let first = dataset.iter().map(|r| r.date).min()?;
        let last = dataset.iter().map(|r| r.date).max()?;
        Some(Self::new(output_dir, first, last))
    }
}

/// Write the three CSV tables and the narrative report.
pub fn write_reports(views: &AggregateViews, paths: &ReportPaths) -> Result<()> {
    for path in [&paths.author_summary, &paths.detailed_report] {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(&paths.author_summary, author_summary_csv(&views.author_summary))?;
    info!("Wrote {}", paths.author_summary.display());
    fs::write(&paths.daily_activity, daily_activity_csv(&views.daily_activity))?;
    info!("Wrote {}", paths.daily_activity.display());
    fs::write(&paths.repository_summary, repository_summary_csv(&views.repository_summary))?;
    info!("Wrote {}", paths.repository_summary.display());
    fs::write(&paths.detailed_report, detailed_report(views))?;
    info!("Wrote {}", paths.detailed_report.display());
    Ok(())
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn author_summary_csv(rows: &[AuthorSummaryRow]) -> String {
    let mut out = String::from("author,commits,additions,deletions,total_lines\n");
    for r in rows {
        let _ = writeln!(
            out,
            "{},{},{},{},{}",
            csv_field(&r.author),
            r.commits,
            r.additions,
            r.deletions,
            r.total_lines
        );
    }
    out
}

pub fn daily_activity_csv(rows: &[DailyActivityRow]) -> String {
    let mut out = String::from("date,author,commits,additions,deletions\n");
    for r in rows {
        let _ = writeln!(
            out,
            "{},{},{},{},{}",
            r.date.format("%Y-%m-%d"),
            csv_field(&r.author),
            r.commits,
            r.additions,
            r.deletions
        );
    }
    out
}

pub fn repository_summary_csv(rows: &[RepositorySummaryRow]) -> String {
    let mut out = String::from("repository,author,commits,additions,deletions\n");
    for r in rows {
        let _ = writeln!(
            out,
            "{},{},{},{},{}",
            csv_field(&r.repository),
            csv_field(&r.author),
            r.commits,
            r.additions,
            r.deletions
        );
    }
    out
}

/// The narrative report: top contributors, monthly activity, repository activity.
pub fn detailed_report(views: &AggregateViews) -> String {
    let banner = "=".repeat(80);
    let rule = "-".repeat(50);
    let mut out = String::new();

    let _ = writeln!(out, "{banner}\nDETAILED CONTRIBUTION REPORT\n{banner}\n");

    let _ = writeln!(out, "1. TOP {REPORT_TOP_AUTHORS} CONTRIBUTORS BY TOTAL IMPACT\n{rule}\n");
    for row in views.author_summary.iter().take(REPORT_TOP_AUTHORS) {
        let _ = writeln!(out, "{}:", row.author);
        let _ = writeln!(out, "  Commits: {}", group_thousands(row.commits));
        let _ = writeln!(out, "  Lines Added: {}", group_thousands(row.additions));
        let _ = writeln!(out, "  Lines Deleted: {}", group_thousands(row.deletions));
        let _ = writeln!(out, "  Total Lines Modified: {}\n", group_thousands(row.total_lines));
    }

    let _ = writeln!(out, "2. MONTHLY ACTIVITY\n{rule}\n");
    for month in &views.monthly.months {
        let _ = writeln!(out, "{}:", month.month);
        let _ = writeln!(out, "  Total Commits: {}", group_thousands(month.commits));
        let _ = writeln!(out, "  Top Contributors:");
        for a in &month.top_authors {
            let _ = writeln!(out, "    - {}: {} commits", a.author, group_thousands(a.commits));
        }
        out.push('\n');
    }

    let _ = writeln!(out, "3. REPOSITORY ACTIVITY\n{rule}\n");
    for repo in &views.monthly.repositories {
        let _ = writeln!(out, "{}:", repo.repository);
        let _ = writeln!(out, "  Total Commits: {}", group_thousands(repo.commits));
        let _ = writeln!(out, "  Top Contributors:");
        for a in &repo.top_authors {
            let _ = writeln!(out, "    - {}: {} commits", a.author, group_thousands(a.commits));
        }
        out.push('\n');
    }

    out
}
