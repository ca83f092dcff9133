//! Comma-separated selectors.

use std::fmt;

use seca_core::Labels;

use crate::filter::Filter;

/// A parsed label selector. All filters must match.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    source: String,
    filters: Vec<Filter>,
}

impl Selector {
    /// Parse a selector. Parsing never fails; malformed filters are kept as
    /// [`Filter::Never`] so the selector as a whole fails closed.
    pub fn parse(raw: &str) -> Self {
        let source = raw.trim().to_string();
        let filters = if source.is_empty() {
            Vec::new()
        } else {
            source.split(',').map(Filter::parse).collect()
        };
        Self { source, filters }
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn matches(&self, labels: &Labels) -> bool {
        self.filters.iter().all(|f| f.matches(labels))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parse `selector` and evaluate it against `labels` in one step.
pub fn matches_selector(labels: &Labels, selector: &str) -> bool {
    Selector::parse(selector).matches(labels)
}
