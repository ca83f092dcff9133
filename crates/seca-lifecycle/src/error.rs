//! Lifecycle error types.

use thiserror::Error;

use seca_scheduler::SchedulerError;
use seca_state::StateError;

/// Errors surfaced to the request layer.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("store did not apply the update for {0}")]
    UpdateSkipped(String),

    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
}

impl From<StateError> for LifecycleError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::NotFound(key) => LifecycleError::NotFound(key),
        }
    }
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
