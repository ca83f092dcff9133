//! seca-state — resource records and the resource store for the SECA mock.
//!
//! # Architecture
//!
//! Records are generic over the kind's spec type (`ResourceRecord<S>`) and
//! keyed by a composite [`ResourceKey`] of tenant, optional workspace, and
//! name. Storage sits behind the object-safe [`ResourceStore`] trait so the
//! lifecycle layer never depends on a concrete container.
//!
//! [`MemoryStore`] is the only implementation: a `HashMap` behind a
//! reader/writer lock. Reads share the lock; `put`, `delete`, and the
//! read-modify-write `update` take it exclusively, so no reader ever sees a
//! half-written record.

pub mod error;
pub mod store;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::{MemoryStore, ResourceStore};
pub use types::*;
