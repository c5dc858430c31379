use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::Config;
use crate::service::locate_analyzer;

#[derive(Debug, Serialize)]
pub struct DoctorReport {
    pub version: String,
    pub analyzer: AnalyzerStatus,
    pub java: JavaStatus,
}

#[derive(Debug, Serialize)]
pub struct AnalyzerStatus {
    pub name: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct JavaStatus {
    pub command: String,
    pub available: bool,
}

/// Run the doctor check: can the analyzer be found, and can it be launched?
pub fn run_doctor(config: &Config, analyzer: &str, project_dir: &Path) -> DoctorReport {
    let path = locate_analyzer(analyzer, project_dir).ok();

    DoctorReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        analyzer: AnalyzerStatus {
            name: analyzer.to_string(),
            found: path.is_some(),
            path,
        },
        java: JavaStatus {
            command: config.java.clone(),
            available: check_java(&config.java),
        },
    }
}

fn check_java(java: &str) -> bool {
    Command::new(java)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doctor_reports_missing_analyzer_and_java() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config {
            java: "/definitely/not/java".to_string(),
            ..Config::default()
        };

        let report = run_doctor(&config, "absent-detector.jar", dir.path());

        assert_eq!(report.version, env!("CARGO_PKG_VERSION"));
        assert!(!report.analyzer.found);
        assert!(report.analyzer.path.is_none());
        assert!(!report.java.available);
    }

    #[test]
    fn test_doctor_finds_analyzer_in_project() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("detector.jar"), "").unwrap();

        let report = run_doctor(&Config::default(), "detector.jar", dir.path());

        assert!(report.analyzer.found);
        assert_eq!(report.analyzer.path, Some(dir.path().join("detector.jar")));
    }
}
