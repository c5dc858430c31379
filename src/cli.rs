use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "smell-sight",
    version,
    about = "Pair test files with production files and report test smells"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Pretty-print JSON output (default: compact)
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Source layout of the project under analysis.
#[derive(clap::Args, Debug, Clone)]
pub struct SourceDirs {
    /// Project base directory; relative paths below are resolved against it
    #[arg(long, default_value = ".")]
    pub project_dir: PathBuf,

    /// Test source root
    #[arg(long, default_value = "src/test/java")]
    pub test_dir: PathBuf,

    /// Production source root
    #[arg(long, default_value = "src/main/java")]
    pub main_dir: PathBuf,
}

impl SourceDirs {
    pub fn test_root(&self) -> PathBuf {
        self.project_dir.join(&self.test_dir)
    }

    pub fn production_root(&self) -> PathBuf {
        self.project_dir.join(&self.main_dir)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the test smell detector over the project and summarize its output
    Detect {
        #[command(flatten)]
        dirs: SourceDirs,

        /// Analyzer to run (default: `analyzer` from the configuration)
        #[arg(short, long)]
        analyzer: Option<String>,

        /// Directory receiving the report (relative to the project)
        #[arg(long, default_value = "target")]
        report_dir: PathBuf,
    },

    /// Show the test → production pairings without running the detector
    Pairs {
        #[command(flatten)]
        dirs: SourceDirs,
    },

    /// Summarize an existing detector output file
    Summarize {
        /// Path to the detector's CSV output
        path: PathBuf,
    },

    /// Check that the detector and the Java launcher are available
    Doctor {
        /// Project base directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Analyzer to look for (default: `analyzer` from the configuration)
        #[arg(short, long)]
        analyzer: Option<String>,
    },

    /// Generate default configuration file
    Init {
        /// Path to write the configuration file (default: ~/.config/smell-sight/config.toml)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_defaults() {
        let cli = Cli::parse_from(["smell-sight", "detect"]);
        assert_eq!(cli.format, OutputFormat::Text);
        let Commands::Detect {
            dirs,
            analyzer,
            report_dir,
        } = cli.command
        else {
            panic!("expected detect");
        };
        assert_eq!(dirs.test_root(), PathBuf::from("./src/test/java"));
        assert_eq!(dirs.production_root(), PathBuf::from("./src/main/java"));
        assert!(analyzer.is_none());
        assert_eq!(report_dir, PathBuf::from("target"));
    }

    #[test]
    fn test_absolute_dirs_ignore_project_dir() {
        let cli = Cli::parse_from([
            "smell-sight",
            "pairs",
            "--project-dir",
            "/work/app",
            "--test-dir",
            "/elsewhere/tests",
        ]);
        let Commands::Pairs { dirs } = cli.command else {
            panic!("expected pairs");
        };
        assert_eq!(dirs.test_root(), PathBuf::from("/elsewhere/tests"));
        assert_eq!(dirs.production_root(), PathBuf::from("/work/app/src/main/java"));
    }

    #[test]
    fn test_global_format_flag() {
        let cli = Cli::parse_from(["smell-sight", "summarize", "out.csv", "--format", "json"]);
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
