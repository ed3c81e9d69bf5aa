use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use cmerge_commit::ChangeSet;
use cmerge_types::MemberId;
use tracing::{info, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::{ChangeSetStore, SubmitReceipt};

struct Inner {
    next_id: i64,
    persisted: Vec<ChangeSet>,
}

/// In-memory change-set store.
///
/// Assigns increasing member ids and keeps every persisted change-set with
/// the assigned id written through. Can be switched to read-only to exercise
/// failure paths.
pub struct InMemoryChangeSetStore {
    inner: RwLock<Inner>,
    read_only: AtomicBool,
}

impl InMemoryChangeSetStore {
    /// Create an empty store that assigns ids starting at 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Create an empty store that assigns ids starting at `first_id`.
    pub fn starting_at(first_id: i64) -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: first_id,
                persisted: Vec::new(),
            }),
            read_only: AtomicBool::new(false),
        }
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only.load(Ordering::SeqCst)
    }

    /// Number of change-sets persisted so far.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).persisted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every persisted change-set, in submit order.
    pub fn persisted(&self) -> Vec<ChangeSet> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .persisted
            .clone()
    }
}

impl Default for InMemoryChangeSetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChangeSetStore for InMemoryChangeSetStore {
    async fn submit(&self, change_set: &ChangeSet) -> StoreResult<SubmitReceipt> {
        if self.is_read_only() {
            warn!("submit refused: store is read-only");
            return Err(StoreError::ReadOnly);
        }
        if !change_set.member.id.is_unpersisted() {
            return Err(StoreError::AlreadyPersisted(change_set.member.id));
        }

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let id = MemberId::new(inner.next_id);
        inner.next_id += 1;

        let mut stored = change_set.clone();
        stored.member.id = id;
        for value in &mut stored.instance_values {
            value.member = id;
        }
        let receipt = SubmitReceipt {
            member: id,
            instance_values: stored.instance_values.len(),
            entity_values: stored.entity_values.len(),
        };
        inner.persisted.push(stored);

        info!(member = %id, values = change_set.len(), "change-set persisted");
        Ok(receipt)
    }
}

impl std::fmt::Debug for InMemoryChangeSetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryChangeSetStore")
            .field("persisted", &self.len())
            .field("read_only", &self.is_read_only())
            .finish()
    }
}
