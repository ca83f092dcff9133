//! seca-selector — label selector engine for SECA list operations.
//!
//! A selector is a comma-separated list of filters that are ANDed together:
//!
//! ```text
//! tier=RD*, iops>=5000, env!=prod
//! ```
//!
//! Each filter is `<keyPattern><operator><valuePattern>`. Operators are
//! recognised in the fixed order `!=`, `>=`, `<=`, `=`, `>`, `<` so that the
//! two-character forms win over their one-character prefixes. Patterns may
//! contain `*` wildcards; everything else is matched literally.
//!
//! Evaluation fails closed: a filter without an operator, with an empty key,
//! or with a non-numeric target for a numeric comparison never matches.

pub mod filter;
pub mod pattern;
pub mod selector;

pub use filter::{Filter, Operator};
pub use pattern::Pattern;
pub use selector::{Selector, matches_selector};
