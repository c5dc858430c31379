use aho_corasick::AhoCorasick;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::models::report::{FileSmells, SmellReport, Summary};

/// Column-name fragments that mark the first record as a header row.
pub const DEFAULT_HEADER_TOKENS: [&str; 5] = [
    "TestFilePath",
    "testFilePath",
    "appName",
    "AssertionRoulette",
    "Assertion Roulette",
];

const FIELD_DELIMITER: char = ',';
const UNKNOWN_FILE: &str = "unknown";

/// Summarizes the analyzer's tabular output.
pub struct Aggregator {
    header_tokens: AhoCorasick,
}

impl Aggregator {
    /// Build an aggregator recognizing headers by the given fragments
    /// (case-sensitive substring match).
    pub fn new<I, P>(header_tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let header_tokens =
            AhoCorasick::new(header_tokens).context("Invalid header token list")?;
        Ok(Self { header_tokens })
    }

    pub fn with_default_tokens() -> Result<Self> {
        Self::new(DEFAULT_HEADER_TOKENS)
    }

    pub fn is_header(&self, record: &str) -> bool {
        self.header_tokens.is_match(record)
    }

    /// Aggregate an output artifact on disk.
    pub fn aggregate_file(&self, path: &Path) -> Result<SmellReport> {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read results: {}", path.display()))?;
        Ok(self.aggregate(&String::from_utf8_lossy(&bytes)))
    }

    /// Aggregate the textual content of an output artifact.
    ///
    /// Blank lines are skipped. Rows shorter or longer than the header are
    /// processed with the fields they have; flagged columns past the end of
    /// the header are counted but not named.
    pub fn aggregate(&self, content: &str) -> SmellReport {
        let mut records = content.lines().filter(|l| !l.trim().is_empty()).peekable();

        let columns: Vec<String> = if records.peek().is_some_and(|first| self.is_header(first)) {
            records
                .next()
                .map(|header| split_fields(header).map(str::to_string).collect())
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        let mut summary = Summary::default();
        let mut files = Vec::new();

        for record in records {
            let row = tally_row(record, &columns);
            summary.files_analyzed += 1;
            if !row.is_clean() {
                summary.files_with_smells += 1;
            }
            summary.total_flags += row.flags;
            files.push(row);
        }

        SmellReport {
            columns,
            files,
            summary,
        }
    }
}

fn split_fields(record: &str) -> impl Iterator<Item = &str> {
    record.split(FIELD_DELIMITER).map(str::trim)
}

fn tally_row(record: &str, columns: &[String]) -> FileSmells {
    let mut fields = split_fields(record);
    let file = display_name(fields.next().unwrap_or(""));

    let mut flags = 0;
    let mut smells = Vec::new();
    for (index, value) in fields.enumerate() {
        if !value.eq_ignore_ascii_case("true") {
            continue;
        }
        flags += 1;
        // Column 0 is the file identifier
        if let Some(name) = columns.get(index + 1) {
            smells.push(name.clone());
        }
    }

    FileSmells {
        file,
        flags,
        smells,
    }
}

/// Base name of a path-like identifier, or the identifier itself.
fn display_name(field: &str) -> String {
    if field.is_empty() {
        return UNKNOWN_FILE.to_string();
    }
    Path::new(field)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| field.to_string())
}
