//! Error types for the resource store.

use thiserror::Error;

/// Result type alias for resource store operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur during resource store operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("not found: {0}")]
    NotFound(String),
}
