use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Why a single artifact contributed nothing. Never fatal to the batch.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("unsupported file type (expected .html or an Excel workbook)")]
    UnsupportedKind,
    #[error("no embedded CSV data found")]
    NoEmbeddedData,
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("workbook has no sheet named {0:?}")]
    MissingSheet(String),
    #[error("no recognizable {missing} column")]
    SchemaMismatch { missing: &'static str },
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

impl ArtifactError {
    pub fn kind(&self) -> WarningKind {
        match self {
            ArtifactError::UnsupportedKind => WarningKind::Unsupported,
            ArtifactError::NoEmbeddedData => WarningKind::NoEmbeddedData,
            ArtifactError::Csv(_) | ArtifactError::Workbook(_) | ArtifactError::MissingSheet(_) => {
                WarningKind::ParseFailed
            }
            ArtifactError::SchemaMismatch { .. } => WarningKind::SchemaMismatch,
            ArtifactError::Io(_) => WarningKind::Unreadable,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("extension {0:?} is not exactly four digits")]
    BadExtension(String),
    #[error("extension {0} maps to an empty user id")]
    EmptyUser(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    NoEmbeddedData,
    ParseFailed,
    SchemaMismatch,
    NoRowsSurvived,
    Unsupported,
    Unreadable,
}

/// Per-artifact signal surfaced to the caller, keyed by source file name.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactWarning {
    pub source: String,
    pub kind: WarningKind,
    pub message: String,
}

impl ArtifactWarning {
    pub fn from_error(source: &str, err: &ArtifactError) -> Self {
        ArtifactWarning {
            source: source.to_string(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    pub fn no_rows(source: &str) -> Self {
        ArtifactWarning {
            source: source.to_string(),
            kind: WarningKind::NoRowsSurvived,
            message: "no rows survived filtering".to_string(),
        }
    }
}

impl fmt::Display for ArtifactWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}
