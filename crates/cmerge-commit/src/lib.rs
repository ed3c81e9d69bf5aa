//! Commit builder for cluster merging.
//!
//! Resolves every merge row to the value chosen in the selection state and
//! routes it by storage scope: per-instance values are addressed by the new
//! member's id, per-entity values by its content hash. The builder performs
//! no I/O and cannot fail; writing the [`ChangeSet`] is the persistence
//! layer's job.

pub mod builder;
pub mod change_set;

pub use builder::build_change_set;
pub use change_set::{ChangeSet, EntityValue, InstanceValue};
