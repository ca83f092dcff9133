//! seca-scheduler — delayed, version-guarded state transitions.
//!
//! Reproduces asynchronous provisioning: after a create or update the
//! lifecycle layer asks the scheduler to move a record to a later state once
//! a delay has passed. Each transition carries the `resourceVersion` it was
//! scheduled against and is applied only if, at fire time, the record still
//! exists with that same version.
//!
//! # Architecture
//!
//! ```text
//! TransitionScheduler
//!   ├── ResourceStore (fire-time check-and-apply via `update`)
//!   ├── Clock (condition timestamps)
//!   └── Pending registry: key → [(id, version, JoinHandle)]
//!       ├── cancel(key)                    — on delete
//!       └── cancel_superseded(key, version) — on update
//! ```
//!
//! A task removes its own registry entry once it has fired, so finished
//! tasks do not accumulate.

pub mod error;
pub mod scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use scheduler::TransitionScheduler;
