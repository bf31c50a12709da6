use std::collections::BTreeMap;

use tracing::debug;

use crate::error::ArtifactError;
use crate::record::RawTable;

/// Canonical attributes a raw column can map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ConnectTime,
    OriginationTime,
    DisconnectTime,
    Extension,
    LoginUserId,
    CalledNumber,
    FinalPattern,
    OriginalPattern,
    FinalPartition,
    OriginalPartition,
    CallingPartition,
}

impl Field {
    pub fn canonical_name(self) -> &'static str {
        match self {
            Field::ConnectTime | Field::OriginationTime => "connectTime",
            Field::DisconnectTime => "disconnectTime",
            Field::Extension => "extension",
            Field::LoginUserId => "userId",
            Field::CalledNumber => "calledNumber",
            Field::FinalPattern | Field::OriginalPattern => "dialPattern",
            Field::FinalPartition => "finalPartition",
            Field::OriginalPartition => "originalPartition",
            Field::CallingPartition => "callingPartition",
        }
    }
}

// Keys are compared against the lower-cased, trimmed header. Exact match only.
const COLUMN_MAP: &[(&str, Field)] = &[
    ("datetimeorigination", Field::OriginationTime),
    ("datetimeconnect", Field::ConnectTime),
    ("datetimedisconnect", Field::DisconnectTime),
    ("callingpartynumber", Field::Extension),
    ("callingpartyunicodeloginuserid", Field::LoginUserId),
    ("finalcalledpartynumber", Field::CalledNumber),
    ("finalcalledpartypattern", Field::FinalPattern),
    ("originalcalledpartypattern", Field::OriginalPattern),
    ("finalcalledpartynumberpartition", Field::FinalPartition),
    ("originalcalledpartynumberpartition", Field::OriginalPartition),
    ("callingpartynumberpartition", Field::CallingPartition),
];

pub fn lookup(header: &str) -> Option<Field> {
    let lower = header.trim().to_lowercase();
    COLUMN_MAP
        .iter()
        .find(|(key, _)| *key == lower)
        .map(|(_, field)| *field)
}

/// Which export era produced the batch; decides the classification strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVariant {
    DialPattern,
    Partition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub extension_raw: Option<String>,
    pub connect_raw: Option<String>,
    pub disconnect_raw: Option<String>,
    pub classification: Option<String>,
    pub extras: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedBatch {
    pub variant: SchemaVariant,
    pub rows: Vec<NormalizedRow>,
}

#[derive(Debug, Default)]
struct Columns {
    connect: Option<usize>,
    origination: Option<usize>,
    disconnect: Option<usize>,
    extension: Option<usize>,
    final_pattern: Option<usize>,
    original_pattern: Option<usize>,
    final_partition: Option<usize>,
    original_partition: Option<usize>,
    calling_partition: Option<usize>,
    // (index, output name) for everything carried along untouched
    passthrough: Vec<(usize, String)>,
}

impl Columns {
    fn resolve(headers: &[String]) -> Self {
        let mut cols = Columns::default();
        for (idx, header) in headers.iter().enumerate() {
            let Some(field) = lookup(header) else {
                cols.passthrough.push((idx, header.clone()));
                continue;
            };
            let slot = match field {
                Field::ConnectTime => &mut cols.connect,
                Field::OriginationTime => &mut cols.origination,
                Field::DisconnectTime => &mut cols.disconnect,
                Field::Extension => &mut cols.extension,
                Field::FinalPattern => &mut cols.final_pattern,
                Field::OriginalPattern => &mut cols.original_pattern,
                Field::FinalPartition => &mut cols.final_partition,
                Field::OriginalPartition => &mut cols.original_partition,
                Field::CallingPartition => &mut cols.calling_partition,
                Field::CalledNumber => {
                    cols.passthrough.push((idx, field.canonical_name().to_string()));
                    continue;
                }
                // Recomputed from the extension, never trusted.
                Field::LoginUserId => continue,
            };
            // First column wins when a header repeats.
            slot.get_or_insert(idx);
        }
        cols
    }

    fn timestamp(&self) -> Option<usize> {
        self.connect.or(self.origination)
    }

    fn partitions(&self) -> [Option<usize>; 3] {
        [self.final_partition, self.original_partition, self.calling_partition]
    }

    fn variant(&self) -> SchemaVariant {
        if self.partitions().iter().any(Option::is_some) {
            SchemaVariant::Partition
        } else {
            SchemaVariant::DialPattern
        }
    }
}

/// A cell counts as missing when empty or whitespace.
pub fn present(row: &[String], idx: Option<usize>) -> Option<String> {
    let value = row.get(idx?)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub fn normalize(table: &RawTable) -> Result<NormalizedBatch, ArtifactError> {
    let cols = Columns::resolve(&table.headers);
    if cols.extension.is_none() {
        return Err(ArtifactError::SchemaMismatch { missing: "calling party number" });
    }
    if cols.timestamp().is_none() {
        return Err(ArtifactError::SchemaMismatch { missing: "timestamp" });
    }

    let variant = cols.variant();
    let mut rows = Vec::with_capacity(table.rows.len());
    let mut unclassifiable = 0usize;

    for row in &table.rows {
        let classification = match variant {
            SchemaVariant::Partition => {
                let first = cols.partitions().into_iter().find_map(|idx| present(row, idx));
                if first.is_none() {
                    unclassifiable += 1;
                    continue;
                }
                first
            }
            SchemaVariant::DialPattern => {
                present(row, cols.final_pattern).or_else(|| present(row, cols.original_pattern))
            }
        };

        let extras = cols
            .passthrough
            .iter()
            .filter_map(|(idx, name)| present(row, Some(*idx)).map(|v| (name.clone(), v)))
            .collect();

        rows.push(NormalizedRow {
            extension_raw: present(row, cols.extension),
            connect_raw: present(row, cols.timestamp()),
            disconnect_raw: present(row, cols.disconnect),
            classification,
            extras,
        });
    }

    debug!(
        ?variant,
        kept = rows.len(),
        dropped = unclassifiable,
        "normalized batch"
    );
    Ok(NormalizedBatch { variant, rows })
}

// ── Tests ──
