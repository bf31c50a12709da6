use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::str::FromStr;

use serde::Serialize;

use crate::directory::ExtensionDirectory;
use crate::record::CanonicalRecord;

pub const WEEKDAY_ORDER: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const FIXED_CATEGORY_ORDER: [&str; 3] = ["International", "Other External", "Mobile"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    User,
    Category,
    Month,
    Weekday,
}

impl Dimension {
    pub fn key<'a>(&self, record: &'a CanonicalRecord) -> Option<&'a str> {
        match self {
            Dimension::User => Some(record.user.as_str()),
            Dimension::Category => Some(record.call_category.label()),
            Dimension::Month => record.month.as_deref(),
            Dimension::Weekday => record.weekday.as_deref(),
        }
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Dimension::User),
            "category" | "call-type" => Ok(Dimension::Category),
            "month" => Ok(Dimension::Month),
            "weekday" => Ok(Dimension::Weekday),
            other => Err(format!("unknown dimension: {other}")),
        }
    }
}

/// Absent fields mean "All".
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub user: Option<String>,
    pub category: Option<String>,
    pub month: Option<String>,
}

impl Filter {
    pub fn matches(&self, r: &CanonicalRecord) -> bool {
        self.user.as_deref().map_or(true, |u| r.user == u)
            && self
                .category
                .as_deref()
                .map_or(true, |c| r.call_category.label() == c)
            && self
                .month
                .as_deref()
                .map_or(true, |m| r.month.as_deref() == Some(m))
    }

    pub fn apply<'a>(&self, records: &'a [CanonicalRecord]) -> Vec<&'a CanonicalRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub key: String,
    pub count: usize,
    /// Sum of known durations; negative durations are included as-is.
    pub total_duration: i64,
}

/// Count and total duration per key. Records without a key are skipped.
pub fn group_by(records: &[&CanonicalRecord], dimension: Dimension) -> Vec<Group> {
    let mut groups: BTreeMap<&str, Group> = BTreeMap::new();
    for r in records {
        let Some(key) = dimension.key(r) else { continue };
        let g = groups.entry(key).or_insert_with(|| Group {
            key: key.to_string(),
            count: 0,
            total_duration: 0,
        });
        g.count += 1;
        g.total_duration = g.total_duration.saturating_add(r.duration_seconds.unwrap_or(0));
    }

    let mut out: Vec<Group> = groups.into_values().collect();
    if dimension == Dimension::Weekday {
        out.sort_by_key(|g| weekday_rank(&g.key));
    } else if dimension == Dimension::Category {
        out.sort_by(|a, b| category_rank(&a.key).cmp(&category_rank(&b.key)));
    }
    out
}

fn weekday_rank(day: &str) -> usize {
    WEEKDAY_ORDER
        .iter()
        .position(|d| *d == day)
        .unwrap_or(WEEKDAY_ORDER.len())
}

// Fixed categories first in display order, then everything else by name.
fn category_rank(label: &str) -> (usize, String) {
    match FIXED_CATEGORY_ORDER.iter().position(|c| *c == label) {
        Some(pos) => (pos, String::new()),
        None => (FIXED_CATEGORY_ORDER.len(), label.to_string()),
    }
}

/// Category columns for a set of records: the three fixed ones always,
/// then Unknown and partition labels that actually occur.
pub fn category_columns(records: &[&CanonicalRecord]) -> Vec<String> {
    let mut columns: Vec<String> = FIXED_CATEGORY_ORDER.iter().map(|c| c.to_string()).collect();
    let others: BTreeSet<&str> = records
        .iter()
        .map(|r| r.call_category.label())
        .filter(|l| !FIXED_CATEGORY_ORDER.contains(l))
        .collect();
    columns.extend(others.into_iter().map(str::to_string));
    columns
}

/// Rows × category counts, as the stacked charts consume them.
#[derive(Debug, Clone, Serialize)]
pub struct Pivot {
    pub columns: Vec<String>,
    pub rows: Vec<PivotRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotRow {
    pub key: String,
    pub counts: Vec<usize>,
}

impl PivotRow {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

impl Pivot {
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.total() == 0)
    }
}

fn pivot_counts(
    records: &[&CanonicalRecord],
    dimension: Dimension,
    columns: &[String],
) -> HashMap<String, Vec<usize>> {
    let mut cells: HashMap<String, Vec<usize>> = HashMap::new();
    for r in records {
        let Some(key) = dimension.key(r) else { continue };
        let Some(col) = columns.iter().position(|c| c == r.call_category.label()) else {
            continue;
        };
        cells
            .entry(key.to_string())
            .or_insert_with(|| vec![0; columns.len()])[col] += 1;
    }
    cells
}

/// Monthly call volume by call type, months ascending.
pub fn monthly(records: &[&CanonicalRecord]) -> Pivot {
    let columns = category_columns(records);
    let cells = pivot_counts(records, Dimension::Month, &columns);
    let months: BTreeSet<&String> = cells.keys().collect();
    let rows = months
        .into_iter()
        .map(|m| PivotRow {
            key: m.clone(),
            counts: cells[m].clone(),
        })
        .collect();
    Pivot { columns, rows }
}

/// Weekly call volume by call type, always Monday through Sunday.
pub fn weekly(records: &[&CanonicalRecord]) -> Pivot {
    let columns = category_columns(records);
    let cells = pivot_counts(records, Dimension::Weekday, &columns);
    let rows = WEEKDAY_ORDER
        .iter()
        .map(|day| PivotRow {
            key: day.to_string(),
            counts: cells
                .get(*day)
                .cloned()
                .unwrap_or_else(|| vec![0; columns.len()]),
        })
        .collect();
    Pivot { columns, rows }
}

/// Total calls per user. Every directory user appears, zero-filled, busiest
/// first; ties keep directory order.
pub fn per_user(records: &[&CanonicalRecord], directory: &ExtensionDirectory) -> Pivot {
    let columns = category_columns(records);
    let cells = pivot_counts(records, Dimension::User, &columns);
    let mut rows: Vec<PivotRow> = directory
        .users()
        .into_iter()
        .map(|user| PivotRow {
            key: user.to_string(),
            counts: cells
                .get(user)
                .cloned()
                .unwrap_or_else(|| vec![0; columns.len()]),
        })
        .collect();
    rows.sort_by_key(|r| std::cmp::Reverse(r.total()));
    Pivot { columns, rows }
}

/// Distinct months present, for filter choices.
pub fn months(records: &[CanonicalRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.month.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ── Tests ──
