use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::aggregate::Aggregator;
use crate::engine::invoker::AnalyzerCommand;
use crate::engine::{discover, exchange, locator, pairing};
use crate::error::SmellError;
use crate::models::pairing::PairingSet;
use crate::models::report::SmellReport;

/// Analyzer name tried in the working directory when nothing else matches.
pub const FALLBACK_ANALYZER: &str = "TestSmellDetector.jar";

/// Find the analyzer on disk.
///
/// Tried in order: `name` as given, `<project>/<name>`, `<project>/lib/<name>`,
/// then [`FALLBACK_ANALYZER`] in the working directory.
pub fn locate_analyzer(name: &str, project_dir: &Path) -> Result<PathBuf> {
    let candidates = [
        PathBuf::from(name),
        project_dir.join(name),
        project_dir.join("lib").join(name),
        PathBuf::from(FALLBACK_ANALYZER),
    ];
    match candidates.into_iter().find(|c| c.is_file()) {
        Some(found) => Ok(found),
        None => bail!(SmellError::analyzer_not_found(name)),
    }
}

/// Inputs of one detection run, all resolved by the caller.
pub struct RunParams<'a> {
    pub test_root: &'a Path,
    pub production_root: &'a Path,
    pub analyzer: &'a Path,
    pub report_dir: &'a Path,
}

/// How a run ended. Every variant is a successful run.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The test root holds no test sources; nothing was executed.
    NoTestFiles,
    /// The analyzer exited cleanly without producing an output artifact.
    NoResults {
        test_files: usize,
        matched: usize,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        diagnostics: Vec<String>,
    },
    Completed {
        test_files: usize,
        matched: usize,
        report_path: PathBuf,
        report: SmellReport,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        diagnostics: Vec<String>,
    },
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTestFiles => write!(f, "No test files (.java) found"),
            Self::NoResults { .. } => {
                write!(f, "No results generated (possibly no test smells)")
            }
            Self::Completed {
                report, report_path, ..
            } => {
                writeln!(f, "{report}")?;
                write!(f, "Report written to {}", report_path.display())
            }
        }
    }
}

/// The detection pipeline: discover → pair → write → invoke → locate → aggregate.
pub struct Pipeline {
    java: String,
    report_name: String,
    aggregator: Aggregator,
}

impl Pipeline {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            java: config.java.clone(),
            report_name: config.report_name.clone(),
            aggregator: Aggregator::new(&config.header_tokens)?,
        })
    }

    /// Discover the test sources under `test_root` and pair each with a
    /// production file under `production_root`. Paths are absolute.
    pub fn pairings(&self, test_root: &Path, production_root: &Path) -> Result<PairingSet> {
        let test_root = absolute(test_root)?;
        let production_root = absolute(production_root)?;

        let test_files = discover::discover_test_files(&test_root)?;
        let pairings = pairing::resolve_all(&test_files, &production_root)?;
        info!(
            test_files = pairings.len(),
            matched = pairings.matched(),
            "paired test files"
        );
        Ok(pairings)
    }

    /// Run the whole pipeline.
    ///
    /// The analyzer's output artifact is copied to `<report_dir>/<report_name>`,
    /// replacing any earlier report, and the copy is summarized.
    pub fn run(&self, params: &RunParams<'_>) -> Result<RunOutcome> {
        if !params.analyzer.is_file() {
            bail!(SmellError::analyzer_not_found(
                &params.analyzer.display().to_string()
            ));
        }
        let command = AnalyzerCommand::for_analyzer(params.analyzer, &self.java)?;

        let pairings = self.pairings(params.test_root, params.production_root)?;
        if pairings.is_empty() {
            info!("no test files, skipping analyzer");
            return Ok(RunOutcome::NoTestFiles);
        }
        let test_files = pairings.len();
        let matched = pairings.matched();

        let input = exchange::write_exchange(&command.working_dir, &pairings)?;
        info!(input = %input.display(), "wrote exchange file");

        let diagnostics = command.invoke(&input)?;

        let Some(output) = locator::locate_output(&input)? else {
            info!("analyzer produced no output file");
            return Ok(RunOutcome::NoResults {
                test_files,
                matched,
                diagnostics,
            });
        };
        info!(output = %output.display(), "found analyzer output");

        let report_path = self.publish(&output, params.report_dir)?;
        let report = self.aggregator.aggregate_file(&report_path)?;

        if let Err(e) = fs::remove_file(&input) {
            warn!(input = %input.display(), error = %e, "could not remove exchange file");
        }

        Ok(RunOutcome::Completed {
            test_files,
            matched,
            report_path,
            report,
            diagnostics,
        })
    }

    /// Summarize an existing analyzer output file.
    pub fn summarize(&self, output: &Path) -> Result<SmellReport> {
        self.aggregator.aggregate_file(output)
    }

    fn publish(&self, output: &Path, report_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(report_dir)
            .with_context(|| format!("Failed to create report directory: {}", report_dir.display()))?;
        let target = report_dir.join(&self.report_name);
        if target.exists() && same_file(output, &target)? {
            debug!(report = %target.display(), "analyzer output already in place");
            return Ok(target);
        }
        fs::copy(output, &target).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                output.display(),
                target.display()
            )
        })?;
        Ok(target)
    }
}

fn same_file(a: &Path, b: &Path) -> Result<bool> {
    let resolve = |p: &Path| {
        fs::canonicalize(p).with_context(|| format!("Failed to resolve path: {}", p.display()))
    };
    Ok(resolve(a)? == resolve(b)?)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("Failed to resolve path: {}", path.display()))
}
