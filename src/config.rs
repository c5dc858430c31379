//! Configuration loading and generation.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::aggregate::DEFAULT_HEADER_TOKENS;

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Enable debug logging to file
    pub debug: bool,

    /// Path to log directory
    pub log_path: PathBuf,

    /// Analyzer file name or path, searched relative to the project
    pub analyzer: String,

    /// Launcher used for `.jar` analyzers
    pub java: String,

    /// Fragments identifying the header row of the analyzer output
    pub header_tokens: Vec<String>,

    /// File name of the report copied into the report directory
    pub report_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            log_path: default_log_path(),
            analyzer: "TestSmellDetector.jar".to_string(),
            java: "java".to_string(),
            header_tokens: DEFAULT_HEADER_TOKENS.iter().map(|t| t.to_string()).collect(),
            report_name: "test-smells-results.csv".to_string(),
        }
    }
}

/// Default log path: ~/.config/smell-sight/logs
fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("smell-sight")
        .join("logs")
}

/// Configuration service.
pub struct ConfigService;

impl ConfigService {
    /// Get the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("smell-sight")
            .join("config.toml")
    }

    /// Load configuration from file.
    ///
    /// If `path` is `None`, uses the default path.
    /// If the file doesn't exist, returns default configuration.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = path.map(PathBuf::from).unwrap_or_else(Self::default_path);
        let config_dir = path.parent();

        if !path.exists() {
            let mut config = Config::default();
            if let Some(dir) = config_dir {
                config.log_path = dir.join("logs");
            }
            return Ok(config);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        // Unset log_path follows the config file
        if config.log_path == default_log_path()
            && let Some(dir) = config_dir
        {
            config.log_path = dir.join("logs");
        }

        Ok(config)
    }

    /// Generate default configuration file at the default path.
    pub fn generate_default() -> Result<()> {
        Self::generate_at(&Self::default_path())
    }

    /// Generate default configuration file at the specified path.
    pub fn generate_at(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = Self::default_config_content();
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Generate default configuration content with comments.
    fn default_config_content() -> String {
        r#"# smell-sight configuration file

# Enable debug logging to file (default: false)
debug = false

# Path to log directory (default: ~/.config/smell-sight/logs)
# log_path = "~/.config/smell-sight/logs"

# Test smell detector, looked up as given, in the project, then in <project>/lib
analyzer = "TestSmellDetector.jar"

# Command used to start .jar analyzers
java = "java"

# Header row fragments (case-sensitive) of the detector output
header_tokens = ["TestFilePath", "testFilePath", "appName", "AssertionRoulette", "Assertion Roulette"]

# Name of the report written to the report directory
report_name = "test-smells-results.csv"
"#
        .to_string()
    }
}
