pub mod excel;
pub mod html;

use csv::ReaderBuilder;

use crate::error::ArtifactError;
use crate::record::{Artifact, ArtifactKind, RawTable};

/// Pull the raw table out of one artifact, dispatching on its file type.
pub fn extract(artifact: &Artifact) -> Result<RawTable, ArtifactError> {
    match artifact.kind() {
        Some(ArtifactKind::Html) => html::extract(&artifact.bytes),
        Some(ArtifactKind::Excel) => excel::extract(&artifact.bytes),
        None => Err(ArtifactError::UnsupportedKind),
    }
}

/// Parse CSV text with a header row. Ragged rows are tolerated; short rows
/// are padded so every row lines up with the header.
pub(crate) fn table_from_csv(data: &[u8]) -> Result<RawTable, ArtifactError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(data);
    let headers = trim_headers(rdr.headers()?.iter());

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(headers.len().max(row.len()), String::new());
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

pub(crate) fn trim_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    names.map(|h| h.trim().to_string()).collect()
}

// ── Tests ──
