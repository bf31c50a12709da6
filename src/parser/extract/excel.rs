use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use super::trim_headers;
use crate::error::ArtifactError;
use crate::record::RawTable;

pub const RAW_DATA_SHEET: &str = "Raw Data";

/// Read the "Raw Data" sheet; the first row is the header.
pub fn extract(bytes: &[u8]) -> Result<RawTable, ArtifactError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    if !workbook.sheet_names().iter().any(|n| n == RAW_DATA_SHEET) {
        return Err(ArtifactError::MissingSheet(RAW_DATA_SHEET.to_string()));
    }
    let range = workbook.worksheet_range(RAW_DATA_SHEET)?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header) => {
            let cells: Vec<String> = header.iter().map(cell_text).collect();
            trim_headers(cells.iter().map(String::as_str))
        }
        None => return Ok(RawTable::default()),
    };

    let rows = rows
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
        .collect();

    Ok(RawTable { headers, rows })
}

/// Integral floats print without a fraction so "7773.0" and 1.7e9 read the
/// same as their HTML counterparts.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

// ── Tests ──
