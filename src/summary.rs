use crate::analyzer::Analyzer;
use crate::config::AnalyzerConfig;
use crate::model::AuthorSummaryRow;
use crate::util::group_thousands;
use anyhow::Context;
use console::style;
use tracing::Dispatch;

pub fn exec(config: AnalyzerConfig, dispatch: Dispatch, quiet: bool, json: bool, ndjson: bool) -> anyhow::Result<()> {
    let analyzer = Analyzer::new(config, dispatch).show_progress(!(quiet || json || ndjson));
    let analysis = analyzer.run().context("Analysis failed")?;
    let rows = &analysis.views.author_summary;

    if json {
        output_json(rows)?;
    } else if ndjson {
        output_ndjson(rows)?;
    } else {
        output_table(rows, rows.len());
    }

    Ok(())
}

fn output_json(rows: &[AuthorSummaryRow]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}

fn output_ndjson(rows: &[AuthorSummaryRow]) -> anyhow::Result<()> {
    for row in rows {
        println!("{}", serde_json::to_string(row)?);
    }
    Ok(())
}

pub fn output_table(rows: &[AuthorSummaryRow], limit: usize) {
    println!(
        "{:<32} {:>8} {:>10} {:>10} {:>12}",
        style("Author").bold(),
        style("Commits").bold(),
        style("Added").bold(),
        style("Deleted").bold(),
        style("Total").bold()
    );
    println!("{}", "─".repeat(76));
    for row in rows.iter().take(limit) {
        println!(
            "{:<32} {:>8} {:>10} {:>10} {:>12}",
            row.author,
            group_thousands(row.commits),
            group_thousands(row.additions),
            group_thousands(row.deletions),
            group_thousands(row.total_lines)
        );
    }
    if rows.len() > limit {
        println!("\n... and {} more authors", rows.len() - limit);
    }
}
