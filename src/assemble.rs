use serde::Serialize;

use crate::error::ArtifactWarning;
use crate::record::CanonicalRecord;

/// Canonical rows produced from one artifact, not yet tagged with provenance.
#[derive(Debug, Clone)]
pub struct FileBatch {
    pub source: String,
    pub records: Vec<CanonicalRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatchStatus {
    /// Nothing was uploaded.
    NoArtifacts,
    /// Files were uploaded but every row was filtered out or failed.
    NothingSurvived,
    Ready(usize),
}

impl BatchStatus {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            BatchStatus::NoArtifacts => Some("Please provide at least one HTML or Excel file."),
            BatchStatus::NothingSurvived => Some("No call data for known extensions in the provided files."),
            BatchStatus::Ready(_) => None,
        }
    }
}

/// Result of one analyze action. Rebuilt from scratch every run.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub records: Vec<CanonicalRecord>,
    pub warnings: Vec<ArtifactWarning>,
    pub status: BatchStatus,
}

/// Concatenate batches in artifact order, then row order, stamping each row
/// with its source file. Identical rows are kept; there is no deduplication.
pub fn assemble(batches: Vec<FileBatch>) -> Vec<CanonicalRecord> {
    let total = batches.iter().map(|b| b.records.len()).sum();
    let mut records = Vec::with_capacity(total);
    for batch in batches {
        records.extend(batch.records.into_iter().map(|mut r| {
            r.source_file = batch.source.clone();
            r
        }));
    }
    records
}

pub fn status(artifact_count: usize, records: &[CanonicalRecord]) -> BatchStatus {
    if artifact_count == 0 {
        BatchStatus::NoArtifacts
    } else if records.is_empty() {
        BatchStatus::NothingSurvived
    } else {
        BatchStatus::Ready(records.len())
    }
}

// ── Tests ──
