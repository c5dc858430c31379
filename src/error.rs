use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    AnalyzerNotFound,
    ExecutionFailed,
    IoError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnalyzerNotFound => write!(f, "ANALYZER_NOT_FOUND"),
            Self::ExecutionFailed => write!(f, "EXECUTION_FAILED"),
            Self::IoError => write!(f, "IO_ERROR"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SmellError {
    pub code: ErrorCode,
    pub message: String,
    /// Exit code of the analyzer process, for `ExecutionFailed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl fmt::Display for SmellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for SmellError {}

impl SmellError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            exit_code: None,
        }
    }

    pub fn analyzer_not_found(name: &str) -> Self {
        Self::new(
            ErrorCode::AnalyzerNotFound,
            format!("Analyzer not found: {name}"),
        )
    }

    pub fn execution_failed(exit_code: i32) -> Self {
        Self {
            code: ErrorCode::ExecutionFailed,
            message: format!("Analyzer failed with exit code {exit_code}"),
            exit_code: Some(exit_code),
        }
    }
}
