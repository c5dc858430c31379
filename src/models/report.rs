use serde::Serialize;
use std::fmt;

/// Flags raised for a single file of the output artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSmells {
    /// Base name of the file identifier (or the raw field)
    pub file: String,
    /// Number of columns set to `true`
    pub flags: usize,
    /// Names of the flagged columns, when the artifact has a header
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub smells: Vec<String>,
}

impl FileSmells {
    pub fn is_clean(&self) -> bool {
        self.flags == 0
    }
}

impl fmt::Display for FileSmells {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return write!(f, "{} — no issues", self.file);
        }
        write!(f, "{} — {}", self.file, plural(self.flags, "flag"))?;
        if !self.smells.is_empty() {
            write!(f, " ({})", self.smells.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub files_analyzed: usize,
    pub files_with_smells: usize,
    pub total_flags: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Summary: {} analyzed, {} with problems, {}",
            plural(self.files_analyzed, "file"),
            plural(self.files_with_smells, "file"),
            plural(self.total_flags, "total flag"),
        )
    }
}

/// Aggregated view of an analyzer output artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SmellReport {
    /// Column names of the header row, empty when the artifact had none
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    pub files: Vec<FileSmells>,
    pub summary: Summary,
}

impl SmellReport {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl fmt::Display for SmellReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            writeln!(f, "no issues detected")?;
        }
        for file in &self.files {
            writeln!(f, "{file}")?;
        }
        writeln!(f)?;
        write!(f, "{}", self.summary)
    }
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}
