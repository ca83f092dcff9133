//! Wildcard patterns for label keys and values.

use regex::Regex;
use tracing::debug;

/// A key or value pattern from a selector filter.
///
/// `*` matches any (possibly empty) substring; all other characters are
/// literal. A pattern without `*` must match exactly.
#[derive(Debug, Clone)]
pub enum Pattern {
    Exact(String),
    Wildcard(Regex),
    /// A wildcard that could not be compiled. Matches nothing.
    Invalid,
}

impl Pattern {
    pub fn compile(raw: &str) -> Self {
        if !raw.contains('*') {
            return Pattern::Exact(raw.to_string());
        }

        let body = raw
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        match Regex::new(&format!("^{body}$")) {
            Ok(re) => Pattern::Wildcard(re),
            Err(e) => {
                debug!(pattern = raw, error = %e, "wildcard pattern rejected");
                Pattern::Invalid
            }
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Pattern::Exact(expected) => expected == value,
            Pattern::Wildcard(re) => re.is_match(value),
            Pattern::Invalid => false,
        }
    }
}
