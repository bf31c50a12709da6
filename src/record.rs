use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// One uploaded file: a name for provenance plus its raw bytes.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Artifact {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Artifact { name, bytes })
    }

    pub fn kind(&self) -> Option<ArtifactKind> {
        ArtifactKind::from_name(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Html,
    Excel,
}

impl ArtifactKind {
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "html" | "htm" => Some(ArtifactKind::Html),
            "xls" | "xlsx" | "xlsm" | "xlsb" => Some(ArtifactKind::Excel),
            _ => None,
        }
    }
}

/// Header row plus data rows, exactly as pulled out of an artifact.
/// Header names are already trimmed; nothing else is interpreted yet.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallCategory {
    International,
    Mobile,
    OtherExternal,
    Unknown,
    /// Partition name taken verbatim from partition-era exports.
    Partition(String),
}

impl CallCategory {
    pub fn label(&self) -> &str {
        match self {
            CallCategory::International => "International",
            CallCategory::Mobile => "Mobile",
            CallCategory::OtherExternal => "Other External",
            CallCategory::Unknown => "Unknown",
            CallCategory::Partition(name) => name,
        }
    }
}

impl fmt::Display for CallCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for CallCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// The normalized, resolved and classified unit handed to the report layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    pub extension: String,
    pub user: String,
    pub connect_time: Option<i64>,
    pub disconnect_time: Option<i64>,
    pub call_category: CallCategory,
    pub date: Option<DateTime<Utc>>,
    pub month: Option<String>,
    pub weekday: Option<String>,
    pub duration_seconds: Option<i64>,
    pub source_file: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, String>,
}

// ── Tests ──
