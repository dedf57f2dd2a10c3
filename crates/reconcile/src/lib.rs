//! Reconciliation of desired-state CallFlow documents with a remote API.
//!
//! The remote API is reached through a `Driver`, which performs whole-tree
//! create, fetch, update, and delete operations and classifies its own
//! failures. A `Reconciler` drives it with trees built from desired state,
//! and flattens what the remote holds back into configuration shape.

mod driver;
mod memory;
mod reconciler;

pub use driver::{Driver, DriverError};
pub use memory::MemoryDriver;
pub use reconciler::{has_drifted, Applied, Error, Reconciler};
