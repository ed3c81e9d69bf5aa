use async_trait::async_trait;
use cmerge_commit::ChangeSet;
use cmerge_types::MemberId;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

/// What the backend reports after persisting a change-set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    /// Id assigned to the merged member.
    pub member: MemberId,
    pub instance_values: usize,
    pub entity_values: usize,
}

/// Persistence collaborator that writes merged change-sets.
///
/// Implementations must either write the whole change-set or nothing: a
/// failed submit leaves no partial state behind so the caller can retry.
#[async_trait]
pub trait ChangeSetStore: Send + Sync {
    /// Persist the change-set and return the id given to the merged member.
    async fn submit(&self, change_set: &ChangeSet) -> StoreResult<SubmitReceipt>;
}
