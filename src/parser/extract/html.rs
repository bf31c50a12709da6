use std::sync::LazyLock;

use regex::Regex;

use super::table_from_csv;
use crate::error::ArtifactError;
use crate::record::RawTable;

// gk_fileData = { "<name>": "<escaped csv>" }, tolerant of quoting style and whitespace.
// The data group is one string literal: escaped quotes stay inside it and any
// script after the closing quote is left out.
static FILE_DATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)gk_fileData\s*=\s*\{[^}]*?["'](?P<filename>[^"']+)["']\s*:\s*(?:"(?P<dq>(?:[^"\\]|\\.)*)"|'(?P<sq>(?:[^'\\]|\\.)*)')"#,
    )
    .unwrap()
});

/// Locate the embedded data block and return the un-escaped CSV text plus
/// the file name the host tool recorded for it.
pub fn find_embedded_csv(html: &str) -> Option<(String, String)> {
    let caps = FILE_DATA_RE.captures(html)?;
    let filename = caps["filename"].to_string();
    let data = caps.name("dq").or_else(|| caps.name("sq"))?;
    Some((filename, unescape(data.as_str())))
}

fn unescape(blob: &str) -> String {
    blob.replace("\\r\\n", "\n")
        .replace("\\\"", "\"")
        .replace("\\'", "'")
}

pub fn extract(bytes: &[u8]) -> Result<RawTable, ArtifactError> {
    let html = String::from_utf8_lossy(bytes);
    let (embedded_name, csv_text) = find_embedded_csv(&html).ok_or(ArtifactError::NoEmbeddedData)?;
    tracing::debug!(embedded = %embedded_name, bytes = csv_text.len(), "found embedded csv");
    table_from_csv(csv_text.as_bytes())
}

// ── Tests ──
