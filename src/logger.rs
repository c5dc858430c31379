//! Logging: warnings on stderr, plus a daily-rotated debug log file.

use anyhow::{Result, anyhow};
use logroller::{LogRollerBuilder, Rotation, RotationAge, TimeZone};
use std::fs;
use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, SystemTime};
use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "smell-sight";

/// Overrides the file log filter, e.g. `SMELL_SIGHT_LOG=smell_sight::engine=trace`.
const LOG_ENV_VAR: &str = "SMELL_SIGHT_LOG";

/// Log files older than this are removed at start-up.
const MAX_LOG_AGE_DAYS: u64 = 3;

/// Flushes the file log when dropped. Hold it until the program exits.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// Warnings and errors (including lines surfaced from the analyzer) always
/// go to stderr. With `debug`, everything from DEBUG up is also written to
/// `<log_path>/smell-sight.YYYY-MM-DD`.
pub fn init(config: &Config, debug: bool) -> Result<LogGuard> {
    let (file_layer, guard) = if debug {
        let (layer, guard) = build_file_layer(&config.log_path)?;
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .with_target(false)
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to set global subscriber: {e}"))?;

    Ok(LogGuard { _file: guard })
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

fn build_file_layer(log_path: &Path) -> Result<(BoxedLayer, WorkerGuard)> {
    if !log_path.exists() {
        fs::create_dir_all(log_path)?;
    }
    cleanup_old_logs(log_path)?;

    let appender = LogRollerBuilder::new(log_path, Path::new(LOG_FILE_PREFIX))
        .rotation(Rotation::AgeBased(RotationAge::Daily))
        .time_zone(TimeZone::Local)
        .max_keep_files(3)
        .build()
        .map_err(|e| anyhow!("Failed to create log roller: {e}"))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let time_format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let local_offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::DEBUG.into())
        .with_env_var(LOG_ENV_VAR)
        .from_env_lossy();

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(OffsetTime::new(local_offset, time_format))
        .with_filter(filter)
        .boxed();

    Ok((layer, guard))
}

/// Remove our log files older than [`MAX_LOG_AGE_DAYS`].
pub fn cleanup_old_logs(log_path: &Path) -> Result<()> {
    if !log_path.is_dir() {
        return Ok(());
    }
    let cutoff = SystemTime::now() - Duration::from_secs(MAX_LOG_AGE_DAYS * 24 * 60 * 60);

    for entry in fs::read_dir(log_path)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let ours = entry
            .file_name()
            .to_str()
            .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX));
        if !ours {
            continue;
        }

        if let Ok(modified) = entry.metadata().and_then(|m| m.modified())
            && modified < cutoff
        {
            let _ = fs::remove_file(entry.path());
        }
    }

    Ok(())
}
