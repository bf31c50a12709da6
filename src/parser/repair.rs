use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Utc, Weekday};
use regex::Regex;

use super::schema::NormalizedRow;

/// Duration assumed when the switch failed to record a connect time.
pub const ASSUMED_CALL_SECS: i64 = 600;

static DIGIT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// Timestamps and everything derived from them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timing {
    pub connect_time: Option<i64>,
    pub disconnect_time: Option<i64>,
    pub date: Option<DateTime<Utc>>,
    pub month: Option<String>,
    pub weekday: Option<String>,
    /// Not clamped: disconnect before connect yields a negative value.
    pub duration_seconds: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct RepairedRow {
    pub extension: Option<String>,
    pub timing: Timing,
    pub classification: Option<String>,
    pub extras: BTreeMap<String, String>,
}

pub fn repair_batch(rows: Vec<NormalizedRow>) -> Vec<RepairedRow> {
    rows.into_iter().map(repair_row).collect()
}

pub fn repair_row(row: NormalizedRow) -> RepairedRow {
    RepairedRow {
        extension: row.extension_raw.as_deref().and_then(extract_extension),
        timing: derive_timing(row.connect_raw.as_deref(), row.disconnect_raw.as_deref()),
        classification: row.classification,
        extras: row.extras,
    }
}

/// First run of exactly four digits, e.g. "SEP 7773" -> "7773".
/// Longer runs such as "77731" never yield a partial match.
pub fn extract_extension(raw: &str) -> Option<String> {
    DIGIT_RUN_RE
        .find_iter(raw)
        .find(|m| m.as_str().len() == 4)
        .map(|m| m.as_str().to_string())
}

/// Integer epoch seconds; decimal renderings like "1700000000.0" are truncated.
pub fn parse_epoch(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return Some(secs);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}

/// Zero connect time means "not captured": back-fill from disconnect.
/// A disconnect too small to back-fill from leaves the connect time missing.
pub fn repair_connect(connect: Option<i64>, disconnect: Option<i64>) -> Option<i64> {
    match (connect, disconnect) {
        (Some(0), Some(d)) => d.checked_sub(ASSUMED_CALL_SECS),
        (c, _) => c,
    }
}

pub fn derive_timing(connect_raw: Option<&str>, disconnect_raw: Option<&str>) -> Timing {
    let disconnect_time = disconnect_raw.and_then(parse_epoch);
    // Repair runs before any derivation so derived fields see the fixed value.
    let connect_time = repair_connect(connect_raw.and_then(parse_epoch), disconnect_time);

    let date = connect_time.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
    let duration_seconds = match (connect_time, disconnect_time) {
        // Out-of-range timestamps give no duration rather than a wrapped one.
        (Some(c), Some(d)) => d.checked_sub(c),
        _ => None,
    };

    Timing {
        connect_time,
        disconnect_time,
        month: date.map(|d| d.format("%Y-%m").to_string()),
        weekday: date.map(|d| weekday_name(d.weekday()).to_string()),
        date,
        duration_seconds,
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ── Tests ──
