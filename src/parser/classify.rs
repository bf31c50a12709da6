use std::sync::LazyLock;

use regex::Regex;

use super::schema::SchemaVariant;
use crate::record::CallCategory;

/// Dialed with the international access code, no route marker.
pub const INTERNATIONAL_TRUNK_PREFIX: &str = "00";
pub const INTERNATIONAL_ROUTE_MARKER: &str = "9.00";
pub const MOBILE_ROUTE_MARKER: &str = "9.08";

static SEVEN_DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{7}$").unwrap());
static MOBILE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[789][0-9]{6,}").unwrap());

pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub category: CallCategory,
}

/// Evaluated top to bottom, first match wins. Order is precedence:
/// a 7-digit number starting with 7/8/9 is Other External, not Mobile.
pub static DIAL_PATTERN_RULES: [Rule; 7] = [
    Rule {
        name: "literal mobile",
        matches: |p| p.eq_ignore_ascii_case("mobile"),
        category: CallCategory::Mobile,
    },
    Rule {
        name: "literal international",
        matches: |p| p.eq_ignore_ascii_case("international"),
        category: CallCategory::International,
    },
    Rule {
        name: "literal other external",
        matches: |p| p.eq_ignore_ascii_case("other external"),
        category: CallCategory::OtherExternal,
    },
    Rule {
        name: "international prefix",
        matches: |p| {
            p.starts_with('+')
                || p.starts_with(INTERNATIONAL_TRUNK_PREFIX)
                || p.starts_with(INTERNATIONAL_ROUTE_MARKER)
        },
        category: CallCategory::International,
    },
    Rule {
        name: "seven digit local",
        matches: |p| SEVEN_DIGITS_RE.is_match(p),
        category: CallCategory::OtherExternal,
    },
    Rule {
        name: "mobile number",
        matches: |p| MOBILE_NUMBER_RE.is_match(p),
        category: CallCategory::Mobile,
    },
    Rule {
        name: "mobile route",
        matches: |p| p.starts_with(MOBILE_ROUTE_MARKER) || p.to_lowercase().contains("mobile"),
        category: CallCategory::Mobile,
    },
];

/// Pick the strategy for the export era that produced the value.
pub fn classify(variant: SchemaVariant, value: Option<&str>) -> CallCategory {
    match variant {
        SchemaVariant::DialPattern => classify_dial_pattern(value),
        SchemaVariant::Partition => classify_partition(value),
    }
}

pub fn classify_dial_pattern(value: Option<&str>) -> CallCategory {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(pattern) => matching_rule(pattern)
            .map(|rule| rule.category.clone())
            .unwrap_or(CallCategory::OtherExternal),
        None => CallCategory::OtherExternal,
    }
}

pub fn matching_rule(pattern: &str) -> Option<&'static Rule> {
    DIAL_PATTERN_RULES.iter().find(|rule| (rule.matches)(pattern))
}

/// The partition name is the category; it is not forced into the fixed set.
pub fn classify_partition(value: Option<&str>) -> CallCategory {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(name) => CallCategory::Partition(name.to_string()),
        None => CallCategory::Unknown,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn dial(p: &str) -> CallCategory {
        classify_dial_pattern(Some(p))
    }

    #[test]
    fn literal_labels() {
        assert_eq!(dial("MOBILE"), CallCategory::Mobile);
        assert_eq!(dial("International"), CallCategory::International);
        assert_eq!(dial("other external"), CallCategory::OtherExternal);
    }

    #[test]
    fn international_prefixes() {
        assert_eq!(dial("+4930123456"), CallCategory::International);
        assert_eq!(dial("00491234567"), CallCategory::International);
        assert_eq!(dial("9.00!"), CallCategory::International);
        assert_eq!(dial("9.00491234567"), CallCategory::International);
    }

    #[test]
    fn route_marker_9_00_is_never_mobile() {
        assert_eq!(dial("9.00123456"), CallCategory::International);
        assert_eq!(matching_rule("9.00123456").unwrap().name, "international prefix");
    }

    #[test]
    fn mobile_route_marker() {
        assert_eq!(dial("9.08012345"), CallCategory::Mobile);
        assert_eq!(dial("9.08[365789]XXXXXXX"), CallCategory::Mobile);
        assert_eq!(dial("Route-Mobile-Out"), CallCategory::Mobile);
    }

    #[test]
    fn seven_digits_before_mobile_number() {
        assert_eq!(dial("7123456"), CallCategory::OtherExternal);
        assert_eq!(matching_rule("7123456").unwrap().name, "seven digit local");
        assert_eq!(dial("71234567"), CallCategory::Mobile);
        assert_eq!(dial("0871234567"), CallCategory::OtherExternal);
        assert_eq!(dial("8712345"), CallCategory::OtherExternal);
    }

    #[test]
    fn fallback_and_missing() {
        assert_eq!(dial("9.XXXXXXX"), CallCategory::OtherExternal);
        assert_eq!(dial("18005551234"), CallCategory::OtherExternal);
        assert_eq!(classify_dial_pattern(None), CallCategory::OtherExternal);
        assert_eq!(classify_dial_pattern(Some("  ")), CallCategory::OtherExternal);
    }

    #[test]
    fn deterministic() {
        for p in ["9.08012345", "9.00123456", "7123456", "+1", "x"] {
            assert_eq!(dial(p), dial(p));
        }
    }

    #[test]
    fn partition_strategy_keeps_label() {
        assert_eq!(
            classify(SchemaVariant::Partition, Some("Intl")),
            CallCategory::Partition("Intl".into())
        );
        assert_eq!(classify(SchemaVariant::Partition, None), CallCategory::Unknown);
        // No pattern matching on partition names
        assert_eq!(
            classify(SchemaVariant::Partition, Some("9.00!")),
            CallCategory::Partition("9.00!".into())
        );
    }

    #[test]
    fn rule_order_is_stable() {
        let names: Vec<_> = DIAL_PATTERN_RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "literal mobile",
                "literal international",
                "literal other external",
                "international prefix",
                "seven digit local",
                "mobile number",
                "mobile route",
            ]
        );
    }
}
