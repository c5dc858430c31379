use anyhow::{Context, Result, anyhow, bail};
use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

use crate::error::{ErrorCode, SmellError};

/// Substrings (lowercase) that make an analyzer output line worth reporting.
const SIGNIFICANT_MARKERS: [&str; 2] = ["error", "exception"];

/// Whether an analyzer output line should be surfaced to the user.
pub fn is_significant(line: &str) -> bool {
    let lower = line.to_lowercase();
    SIGNIFICANT_MARKERS.iter().any(|m| lower.contains(m))
}

/// How to launch the analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub working_dir: PathBuf,
}

impl AnalyzerCommand {
    /// Build the command for an analyzer on disk.
    ///
    /// A `.jar` is started as `<java> -jar <jar>`; anything else is run
    /// directly. The working directory is the analyzer's own directory.
    pub fn for_analyzer(analyzer: &Path, java: &str) -> Result<Self> {
        let analyzer = std::path::absolute(analyzer)
            .with_context(|| format!("Failed to resolve analyzer path: {}", analyzer.display()))?;
        let working_dir = analyzer
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let is_jar = analyzer
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("jar"));

        let (program, args) = if is_jar {
            (
                OsString::from(java),
                vec![OsString::from("-jar"), analyzer.into_os_string()],
            )
        } else {
            (analyzer.into_os_string(), Vec::new())
        };

        Ok(Self {
            program,
            args,
            working_dir,
        })
    }

    /// Run the analyzer on `exchange` and wait for it to exit.
    ///
    /// Both output streams are drained on reader threads while this thread
    /// waits, keeping only the lines [`is_significant`] accepts. Those lines
    /// are returned on success. A non-zero exit is an `ExecutionFailed`
    /// error, whatever the analyzer printed or wrote.
    pub fn invoke(&self, exchange: &Path) -> Result<Vec<String>> {
        let exchange = std::path::absolute(exchange)
            .with_context(|| format!("Failed to resolve path: {}", exchange.display()))?;

        info!(
            program = %self.program.to_string_lossy(),
            input = %exchange.display(),
            "launching analyzer"
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(&exchange)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                SmellError::new(
                    ErrorCode::IoError,
                    format!(
                        "Failed to launch analyzer {}: {e}",
                        self.program.to_string_lossy()
                    ),
                )
            })?;

        let stdout = child.stdout.take().context("analyzer stdout not captured")?;
        let stderr = child.stderr.take().context("analyzer stderr not captured")?;
        let stdout_reader = spawn_drain(stdout);
        let stderr_reader = spawn_drain(stderr);

        let status = child.wait().context("Failed to wait for analyzer")?;

        let mut surfaced = join_drain(stdout_reader)?;
        surfaced.extend(join_drain(stderr_reader)?);
        for line in &surfaced {
            warn!(line = line.as_str(), "analyzer reported");
        }

        // Killed by a signal: no exit code
        let code = status.code().unwrap_or(-1);
        if code != 0 {
            bail!(SmellError::execution_failed(code));
        }
        info!(surfaced = surfaced.len(), "analyzer finished");
        Ok(surfaced)
    }
}

fn spawn_drain<R: Read + Send + 'static>(stream: R) -> JoinHandle<std::io::Result<Vec<String>>> {
    thread::spawn(move || drain_significant(stream))
}

fn join_drain(handle: JoinHandle<std::io::Result<Vec<String>>>) -> Result<Vec<String>> {
    let lines = handle
        .join()
        .map_err(|_| anyhow!("analyzer output reader panicked"))?
        .context("Failed to read analyzer output")?;
    Ok(lines)
}

/// Read `stream` to the end, keeping the significant lines.
/// Bytes that are not UTF-8 are replaced rather than rejected.
fn drain_significant<R: Read>(stream: R) -> std::io::Result<Vec<String>> {
    let mut kept = Vec::new();
    for chunk in BufReader::new(stream).split(b'\n') {
        let chunk = chunk?;
        let line = String::from_utf8_lossy(&chunk);
        let line = line.trim_end_matches('\r');
        if is_significant(line) {
            kept.push(line.to_string());
        }
    }
    Ok(kept)
}
