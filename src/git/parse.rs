//! Parsers for the line formats requested from `git log` and `git show --numstat`.

use crate::error::{ContribError, Result};
use chrono::NaiveDate;
use tracing::warn;

/// `--format` for one commit header per line: `hash|date|author`.
pub const LOG_FORMAT: &str = "--format=%H|%ad|%an";
/// Record separator byte that introduces each header in batched output.
pub const HEADER_MARKER: char = '\u{1e}';
pub const BATCHED_LOG_FORMAT: &str = "--format=%x1e%H|%ad|%an";
/// Merge commits report their diff against the first parent, in `log` and `show` alike.
pub const MERGE_DIFF: &str = "--diff-merges=first-parent";
/// Count placeholder git prints for binary files.
pub const BINARY_PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub hash: String,
    pub date: NaiveDate,
    pub author: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStat {
    pub additions: u64,
    pub deletions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumstatLine {
    Text { added: u64, deleted: u64 },
    Binary,
}

/// Parse `hash|YYYY-MM-DD|author`. Any other number of `|`-separated fields is malformed.
pub fn parse_log_line(line: &str) -> Result<LogEntry> {
    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('|').collect();
    let [hash, date, author] = fields.as_slice() else {
        return Err(ContribError::Parse(format!(
            "expected hash|date|author, got {} fields in '{line}'",
            fields.len()
        )));
    };

    let hash = hash.trim();
    if hash.is_empty() || !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ContribError::Parse(format!("invalid commit hash '{hash}'")));
    }

    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|e| ContribError::Parse(format!("invalid commit date '{date}': {e}")))?;

    Ok(LogEntry {
        hash: hash.to_string(),
        date,
        author: author.trim().to_string(),
    })
}

/// Parse `added<TAB>deleted<TAB>path`.
pub fn parse_numstat_line(line: &str) -> Result<NumstatLine> {
    let mut fields = line.splitn(3, '\t');
    let (Some(added), Some(deleted), Some(_path)) = (fields.next(), fields.next(), fields.next()) else {
        return Err(ContribError::Parse(format!("expected added<TAB>deleted<TAB>path, got '{line}'")));
    };

    if added == BINARY_PLACEHOLDER || deleted == BINARY_PLACEHOLDER {
        return Ok(NumstatLine::Binary);
    }

    let count = |field: &str| {
        field
            .parse::<u64>()
            .map_err(|e| ContribError::Parse(format!("invalid line count '{field}': {e}")))
    };
    Ok(NumstatLine::Text {
        added: count(added)?,
        deleted: count(deleted)?,
    })
}

impl DiffStat {
    fn add_line(&mut self, line: &str) {
        match parse_numstat_line(line) {
            Ok(NumstatLine::Text { added, deleted }) => {
                self.additions += added;
                self.deletions += deleted;
            }
            Ok(NumstatLine::Binary) => {}
            Err(e) => warn!("Skipping numstat line: {e}"),
        }
    }
}

/// Sum the non-binary lines of `git show --numstat --format=` output.
pub fn sum_numstat(output: &str) -> DiffStat {
    let mut stat = DiffStat::default();
    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        stat.add_line(line);
    }
    stat
}

/// Split `git log --numstat` output produced with [`BATCHED_LOG_FORMAT`] into commits and their stats.
///
/// Numstat lines following a malformed header are discarded with it.
pub fn parse_batched_log(output: &str) -> Vec<(LogEntry, DiffStat)> {
    let mut commits: Vec<(LogEntry, DiffStat)> = Vec::new();
    let mut current_valid = false;

    for line in output.lines() {
        if let Some(header) = line.strip_prefix(HEADER_MARKER) {
            match parse_log_line(header) {
                Ok(entry) => {
                    commits.push((entry, DiffStat::default()));
                    current_valid = true;
                }
                Err(e) => {
                    warn!("Skipping commit line: {e}");
                    current_valid = false;
                }
            }
            continue;
        }

        if line.trim().is_empty() {
            continue;
        }

        match commits.last_mut() {
            Some((_, stat)) if current_valid => stat.add_line(line),
            _ => warn!("Skipping numstat line outside of a commit: '{line}'"),
        }
    }

    commits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numstat_sums_skip_binary_and_garbage() {
        let out = "10\t2\tsrc/a.rs\n-\t-\tlogo.png\n3\t0\tREADME.md\nx\t1\tbad\n\n";
        assert_eq!(
            sum_numstat(out),
            DiffStat {
                additions: 13,
                deletions: 2
            }
        );
    }

    #[test]
    fn log_line_needs_exactly_three_fields() {
        let entry = parse_log_line("abc123|2024-01-01|Jane Doe").unwrap();
        assert_eq!(entry.author, "Jane Doe");
        assert!(matches!(parse_log_line("abc123|2024-01-01|a|b"), Err(ContribError::Parse(_))));
        assert!(matches!(parse_log_line("abc123|2024-01-01"), Err(ContribError::Parse(_))));
        assert!(matches!(parse_log_line("xyz|2024-01-01|a"), Err(ContribError::Parse(_))));
    }

    #[test]
    fn batched_output_skips_header_with_extra_field() {
        let out = "\u{1e}aaaa|2024-01-05|a|b\n3\t1\tx.txt\n\u{1e}bbbb|2024-01-06|Bob\n1\t0\ty.txt\n";
        let parsed = parse_batched_log(out);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].0.hash, "bbbb");
        assert_eq!(parsed[0].1, DiffStat { additions: 1, deletions: 0 });
    }

    #[test]
    fn half_binary_line_counts_as_binary() {
        assert_eq!(parse_numstat_line("-\t4\tblob").unwrap(), NumstatLine::Binary);
    }

    #[test]
    fn batched_output_attributes_stats() {
        let out = "\u{1e}aaaa|2024-01-05|Alice\n\n5\t1\ta.txt\n1\t1\tb.txt\n\
                   \u{1e}bbbb|2024-01-04|Bob\n\
                   \u{1e}not a header\n7\t7\tlost.txt\n\
                   \u{1e}cccc|2024-01-03|Carol\n-\t-\timg.png\n";
        let parsed = parse_batched_log(out);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].0.author, "Alice");
        assert_eq!(parsed[0].1, DiffStat { additions: 6, deletions: 2 });
        assert_eq!(parsed[1].1, DiffStat::default());
        assert_eq!(parsed[2].0.hash, "cccc");
        assert_eq!(parsed[2].1, DiffStat::default());
    }
}
