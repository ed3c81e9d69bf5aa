//! Persistence boundary for merged change-sets.
//!
//! The merge engine never writes anything itself. It hands a finished
//! [`ChangeSet`](cmerge_commit::ChangeSet) to a [`ChangeSetStore`], which
//! either persists it and returns a [`SubmitReceipt`] or reports a failure
//! the caller may retry.
//!
//! # Storage Backends
//!
//! - [`InMemoryChangeSetStore`] -- `Vec`-backed store for tests and embedding

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryChangeSetStore;
pub use traits::{ChangeSetStore, SubmitReceipt};
