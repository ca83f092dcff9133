//! Single selector filters: `<keyPattern><operator><valuePattern>`.

use seca_core::Labels;

use crate::pattern::Pattern;

/// Comparison operator of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    NotEqual,
    GreaterOrEqual,
    LessOrEqual,
    Equal,
    Greater,
    Less,
}

impl Operator {
    /// Recognition order. Two-character operators come first so `!=` is
    /// never read as `=`.
    pub const PRIORITY: [Operator; 6] = [
        Operator::NotEqual,
        Operator::GreaterOrEqual,
        Operator::LessOrEqual,
        Operator::Equal,
        Operator::Greater,
        Operator::Less,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Operator::NotEqual => "!=",
            Operator::GreaterOrEqual => ">=",
            Operator::LessOrEqual => "<=",
            Operator::Equal => "=",
            Operator::Greater => ">",
            Operator::Less => "<",
        }
    }

    fn compare(&self, current: f64, target: f64) -> bool {
        match self {
            Operator::Greater => current > target,
            Operator::Less => current < target,
            Operator::GreaterOrEqual => current >= target,
            Operator::LessOrEqual => current <= target,
            Operator::Equal | Operator::NotEqual => false,
        }
    }
}

/// A parsed filter, ready to evaluate against a label set.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Blank segment (e.g. a trailing comma). Matches everything.
    Any,
    /// `key=value`: some label pair matches both patterns.
    Equal { key: Pattern, value: Pattern },
    /// `key!=value`: no label pair matches both patterns.
    NotEqual { key: Pattern, value: Pattern },
    /// `key>n`, `key<n`, `key>=n`, `key<=n`.
    Compare {
        key: Pattern,
        op: Operator,
        target: f64,
    },
    /// Unparseable filter. Matches nothing.
    Never,
}

impl Filter {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Filter::Any;
        }

        let Some((op, key, value)) = Operator::PRIORITY.iter().find_map(|op| {
            raw.split_once(op.token())
                .map(|(key, value)| (*op, key.trim(), value.trim()))
        }) else {
            return Filter::Never;
        };

        if key.is_empty() {
            return Filter::Never;
        }

        match op {
            Operator::Equal => Filter::Equal {
                key: Pattern::compile(key),
                value: Pattern::compile(value),
            },
            Operator::NotEqual => Filter::NotEqual {
                key: Pattern::compile(key),
                value: Pattern::compile(value),
            },
            _ => match parse_number(value) {
                Some(target) => Filter::Compare {
                    key: Pattern::compile(key),
                    op,
                    target,
                },
                None => Filter::Never,
            },
        }
    }

    pub fn matches(&self, labels: &Labels) -> bool {
        match self {
            Filter::Any => true,
            Filter::Never => false,
            Filter::Equal { key, value } => labels
                .iter()
                .any(|(k, v)| key.matches(k) && value.matches(v)),
            Filter::NotEqual { key, value } => !labels
                .iter()
                .any(|(k, v)| key.matches(k) && value.matches(v)),
            Filter::Compare { key, op, target } => labels
                .iter()
                .filter(|(k, _)| key.matches(k))
                .filter_map(|(_, v)| parse_number(v))
                .any(|current| op.compare(current, *target)),
        }
    }
}

/// Parse a float, rejecting literals that overflow to infinity. Spelled-out
/// infinities (`inf`, `-Infinity`) are still accepted.
fn parse_number(raw: &str) -> Option<f64> {
    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() {
        return Some(value);
    }
    let unsigned = raw.trim_start_matches(['+', '-']).to_ascii_lowercase();
    matches!(unsigned.as_str(), "inf" | "infinity" | "nan").then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn not_equal_is_not_misread_as_equal() {
        let f = Filter::parse("tier!=RD100");
        assert!(matches!(f, Filter::NotEqual { .. }));
        assert!(!f.matches(&labels(&[("tier", "RD100")])));
        assert!(f.matches(&labels(&[("tier", "RD500")])));
    }

    #[test]
    fn greater_or_equal_is_not_misread_as_greater() {
        let f = Filter::parse("iops>=500");
        assert!(matches!(
            f,
            Filter::Compare {
                op: Operator::GreaterOrEqual,
                ..
            }
        ));
        assert!(f.matches(&labels(&[("iops", "500")])));
        assert!(!f.matches(&labels(&[("iops", "499")])));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let f = Filter::parse("  tier = RD100  ");
        assert!(f.matches(&labels(&[("tier", "RD100")])));
    }

    #[test]
    fn missing_operator_fails_closed() {
        let f = Filter::parse("foo");
        assert!(matches!(f, Filter::Never));
        assert!(!f.matches(&labels(&[("foo", "bar")])));
    }

    #[test]
    fn empty_key_fails_closed() {
        assert!(matches!(Filter::parse("=RD100"), Filter::Never));
        assert!(matches!(Filter::parse(" >= 5"), Filter::Never));
    }

    #[test]
    fn numeric_target_must_parse() {
        let f = Filter::parse("iops>lots");
        assert!(matches!(f, Filter::Never));
        assert!(!f.matches(&labels(&[("iops", "100")])));
    }

    #[test]
    fn non_numeric_label_values_are_skipped() {
        let f = Filter::parse("*>10");
        let set = labels(&[("name", "disk"), ("iops", "20")]);
        assert!(f.matches(&set));

        let only_text = labels(&[("name", "disk")]);
        assert!(!f.matches(&only_text));
    }

    #[test]
    fn equal_is_existential_over_pairs() {
        let f = Filter::parse("*=LocalDurable");
        let set = labels(&[("tier", "LD100"), ("type", "LocalDurable")]);
        assert!(f.matches(&set));
    }

    #[test]
    fn not_equal_is_universal_over_pairs() {
        let f = Filter::parse("t*!=Local*");
        assert!(!f.matches(&labels(&[("tier", "LD100"), ("type", "LocalDurable")])));
        assert!(f.matches(&labels(&[("tier", "RD100"), ("type", "RemoteDurable")])));
        // Nothing to contradict it on an empty set.
        assert!(f.matches(&Labels::new()));
    }

    #[test]
    fn equal_on_empty_labels_is_false() {
        assert!(!Filter::parse("tier=*").matches(&Labels::new()));
    }

    #[test]
    fn less_than_comparisons() {
        let set = labels(&[("iops", "100")]);
        assert!(Filter::parse("iops<101").matches(&set));
        assert!(!Filter::parse("iops<100").matches(&set));
        assert!(Filter::parse("iops<=100").matches(&set));
        assert!(Filter::parse("iops<=1e3").matches(&set));
    }

    #[test]
    fn blank_segment_matches() {
        assert!(Filter::parse("   ").matches(&Labels::new()));
    }

    #[test]
    fn operator_splits_at_first_occurrence() {
        // `!=` is recognised first, so the key pattern keeps the `=`.
        let f = Filter::parse("a=b!=c");
        assert!(!f.matches(&labels(&[("a=b", "c")])));
        assert!(f.matches(&labels(&[("a", "b")])));
    }

    #[test]
    fn overflowing_target_never_matches() {
        let filter = Filter::parse("iops>=1e400");
        assert!(matches!(filter, Filter::Never));
        assert!(!filter.matches(&labels(&[("iops", "5000")])));
    }

    #[test]
    fn overflowing_label_values_are_skipped() {
        let filter = Filter::parse("iops>100");
        assert!(!filter.matches(&labels(&[("iops", "1e400")])));
        assert!(filter.matches(&labels(&[("iops", "inf")])));
    }
}
