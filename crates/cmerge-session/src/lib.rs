//! Merge session for a cluster of duplicate records.
//!
//! A [`MergeSession`] owns the members, schemas, rows and selection state
//! for one open merge surface. Rows are rebuilt on open and on explicit
//! rebuild; the selection survives rebuilds where still valid. Submitting
//! hands the change-set to a [`ChangeSetStore`](cmerge_store::ChangeSetStore)
//! behind a guard that allows at most one submit in flight.

pub mod config;
pub mod error;
pub mod session;

pub use config::MergeConfig;
pub use error::{SessionError, SessionResult};
pub use session::{MergeSession, SessionId};

// Re-export key types
pub use cmerge_commit::ChangeSet;
pub use cmerge_rows::{MergeOption, MergeRow, OptionKey, SelectionState};
pub use cmerge_store::{ChangeSetStore, SubmitReceipt};
pub use cmerge_types::{Member, MemberId, PropertyId, PropertySchema};
