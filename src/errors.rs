use std::fmt;

use thiserror::Error;

/// Error type that captures storage, configuration, and input failures.
#[derive(Debug, Error)]
pub enum MoniError {
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MoniError>;

impl From<std::io::Error> for MoniError {
    fn from(err: std::io::Error) -> Self {
        MoniError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for MoniError {
    fn from(err: serde_json::Error) -> Self {
        MoniError::Serialization(err.to_string())
    }
}

/// Distinguishes the two ways an import blob can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportErrorKind {
    /// The text could not be parsed as JSON at all.
    Malformed,
    /// The text parsed but does not carry the expected collections.
    SchemaInvalid,
}

impl fmt::Display for ImportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ImportErrorKind::Malformed => "malformed",
            ImportErrorKind::SchemaInvalid => "schema-invalid",
        };
        f.write_str(label)
    }
}

/// Rejected import, carrying a message suitable for direct display.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ImportError {
    pub kind: ImportErrorKind,
    pub message: String,
}

impl ImportError {
    pub fn malformed(detail: impl fmt::Display) -> Self {
        Self {
            kind: ImportErrorKind::Malformed,
            message: format!("Could not read the backup file as JSON: {detail}"),
        }
    }

    pub fn schema_invalid(detail: impl Into<String>) -> Self {
        Self {
            kind: ImportErrorKind::SchemaInvalid,
            message: format!("Invalid backup format: {}", detail.into()),
        }
    }
}

/// Failures of the external advisor integration. None of them touch stored data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdvisorError {
    #[error("An analysis request is already in progress")]
    Busy,
    #[error("No advisor API key configured")]
    MissingCredential,
    #[error("Advisor service failed: {0}")]
    Service(String),
    #[error("Advisor request ended without a result")]
    Disconnected,
}
