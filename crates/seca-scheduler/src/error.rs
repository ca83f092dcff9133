//! Scheduler error types.

use thiserror::Error;

/// Errors that can occur when building a scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("no tokio runtime available to run transitions: {0}")]
    NoRuntime(String),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
