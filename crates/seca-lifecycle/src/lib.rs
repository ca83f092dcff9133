//! seca-lifecycle — simulated provisioning for SECA resources.
//!
//! Each resource kind gets a [`Lifecycle`] that owns the kind's store and
//! transition scheduler and implements create/update/delete/get/list:
//!
//! ```text
//! create  (absent)  → pending ──100ms──▶ creating ──600ms──▶ active
//! update  (present) → updating ──500ms──▶ active      (version + 1)
//! delete            → removed at once, pending transitions cancelled
//! ```
//!
//! Transitions are bound to the `resourceVersion` they were scheduled
//! against, so an update or delete always wins over older work.
//!
//! [`SkuCatalog`] serves the static storage SKU list, filtered through the
//! label selector engine. [`MockCloud`] wires everything up from config.

pub mod catalog;
pub mod cloud;
pub mod error;
pub mod kinds;
pub mod lifecycle;

pub use catalog::{SkuCatalog, SkuDefinition, StorageSku, StorageType};
pub use cloud::MockCloud;
pub use error::{LifecycleError, LifecycleResult};
pub use kinds::{BlockStorageSpec, WorkspaceSpec};
pub use lifecycle::{Applied, Lifecycle, ResourceRequest};
