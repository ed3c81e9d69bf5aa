use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use cmerge_commit::{build_change_set, ChangeSet};
use cmerge_rows::{build_rows, MergeRow, OptionKey, RowConfig, SelectionState};
use cmerge_store::{ChangeSetStore, SubmitReceipt};
use cmerge_types::{Member, MemberId, PropertyId, PropertySchema};
use tracing::{debug, info, warn};

use crate::config::MergeConfig;
use crate::error::{SessionError, SessionResult};

/// Unique identifier for a merge session (UUID v7 for time-ordering).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Short representation (first 8 characters of the UUID).
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.short_id())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Default)]
struct SessionState {
    open: bool,
    members: Vec<Member>,
    schemas: Vec<PropertySchema>,
    rows: Vec<MergeRow>,
    selection: SelectionState,
    base: Option<MemberId>,
}

impl SessionState {
    fn rebuild(&mut self, config: &RowConfig) {
        let (rows, selection) = build_rows(&self.members, &self.schemas, &self.selection, config);
        self.rows = rows;
        self.selection = selection;
        let base_present = self
            .base
            .is_some_and(|id| self.members.iter().any(|m| m.id == id));
        if !base_present {
            self.base = self.members.first().map(|m| m.id);
        }
    }

    fn base_member(&self) -> Option<&Member> {
        let base = self.base?;
        self.members.iter().find(|m| m.id == base)
    }
}

/// Releases the in-flight flag when dropped, on every exit path.
struct SubmitGuard<'a>(&'a AtomicBool);

impl<'a> SubmitGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One open merge surface for a cluster.
///
/// All state mutations go through the session's lock; builders run to
/// completion under it. The only suspension point is the store call inside
/// [`MergeSession::submit`], which runs with no lock held.
pub struct MergeSession {
    id: SessionId,
    row_config: RowConfig,
    state: RwLock<SessionState>,
    submitting: AtomicBool,
}

impl MergeSession {
    /// Open a session and build its rows. The base member defaults to the
    /// first member.
    pub fn open(members: Vec<Member>, schemas: Vec<PropertySchema>, config: &MergeConfig) -> Self {
        let row_config = config.row_config();
        let mut state = SessionState {
            open: true,
            members,
            schemas,
            ..SessionState::default()
        };
        state.rebuild(&row_config);

        let id = SessionId::new();
        info!(
            session = %id,
            members = state.members.len(),
            rows = state.rows.len(),
            "merge session opened"
        );
        Self {
            id,
            row_config,
            state: RwLock::new(state),
            submitting: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.read().open
    }

    /// Whether a submit is currently in flight.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub fn rows(&self) -> Vec<MergeRow> {
        self.read().rows.clone()
    }

    pub fn selection(&self) -> SelectionState {
        self.read().selection.clone()
    }

    pub fn members(&self) -> Vec<Member> {
        self.read().members.clone()
    }

    /// The member the merged record is copied from.
    pub fn base(&self) -> Option<MemberId> {
        self.read().base
    }

    /// Replace the member set and rebuild rows, keeping selections that
    /// still name an option.
    pub fn rebuild(&self, members: Vec<Member>) -> SessionResult<()> {
        let mut state = self.write_open()?;
        state.members = members;
        state.rebuild(&self.row_config);
        debug!(
            session = %self.id,
            members = state.members.len(),
            rows = state.rows.len(),
            "merge rows rebuilt"
        );
        Ok(())
    }

    /// Choose an option for one property.
    pub fn select(&self, property: PropertyId, key: OptionKey) -> SessionResult<()> {
        let mut state = self.write_open()?;
        let SessionState { rows, selection, .. } = &mut *state;
        selection.choose(rows, property, key)?;
        debug!(session = %self.id, %property, %key, "option selected");
        Ok(())
    }

    /// Choose which member the merged record is copied from.
    pub fn set_base(&self, member: MemberId) -> SessionResult<()> {
        let mut state = self.write_open()?;
        if !state.members.iter().any(|m| m.id == member) {
            return Err(SessionError::UnknownMember(member));
        }
        state.base = Some(member);
        Ok(())
    }

    /// Build the change-set for the current selection without submitting.
    pub fn preview(&self) -> SessionResult<ChangeSet> {
        let state = self.read();
        if !state.open {
            return Err(SessionError::Closed);
        }
        let base = state.base_member().ok_or(SessionError::EmptyCluster)?;
        Ok(build_change_set(base, &state.rows, &state.selection))
    }

    /// Submit the change-set to `store`.
    ///
    /// Rejected with [`SessionError::SubmitInProgress`] while another submit
    /// is pending; the store is never called twice concurrently. On success
    /// the session closes. On failure rows and selection are left untouched
    /// so the caller can retry.
    pub async fn submit<S>(&self, store: &S) -> SessionResult<SubmitReceipt>
    where
        S: ChangeSetStore + ?Sized,
    {
        let Some(_guard) = SubmitGuard::acquire(&self.submitting) else {
            warn!(session = %self.id, "submit ignored: another submit is in flight");
            return Err(SessionError::SubmitInProgress);
        };
        let change_set = self.preview()?;

        match store.submit(&change_set).await {
            Ok(receipt) => {
                info!(session = %self.id, member = %receipt.member, "merge submitted");
                self.close();
                Ok(receipt)
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "merge submit failed; session kept open");
                Err(SessionError::SubmitFailed(e))
            }
        }
    }

    /// Close the session and drop all derived state.
    pub fn close(&self) {
        let mut state = self.write();
        *state = SessionState::default();
        debug!(session = %self.id, "merge session closed");
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_open(&self) -> SessionResult<RwLockWriteGuard<'_, SessionState>> {
        let state = self.write();
        if !state.open {
            return Err(SessionError::Closed);
        }
        Ok(state)
    }
}

impl fmt::Debug for MergeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("MergeSession")
            .field("id", &self.id)
            .field("open", &state.open)
            .field("members", &state.members.len())
            .field("rows", &state.rows.len())
            .field("submitting", &self.is_submitting())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use cmerge_store::{InMemoryChangeSetStore, StoreResult};
    use cmerge_types::{ContentHash, PropertyScope, PropertyType, PropertyValue};
    use tokio::sync::Notify;

    fn member(id: i64, name: &str) -> Member {
        Member::new(id, ContentHash::of_bytes(format!("m{id}").as_bytes()), format!("m{id}.jpg"))
            .with_property(2, PropertyValue::text(name))
    }

    fn schemas() -> Vec<PropertySchema> {
        vec![PropertySchema::new(2, "name", PropertyType::Text, PropertyScope::Entity)]
    }

    fn open(members: Vec<Member>) -> MergeSession {
        MergeSession::open(members, schemas(), &MergeConfig::default())
    }

    fn name() -> PropertyId {
        PropertyId::new(2)
    }

    #[test]
    fn open_builds_rows_and_defaults() {
        let session = open(vec![member(1, "A"), member(2, "B")]);
        assert!(session.is_open());
        assert_eq!(session.rows().len(), 1);
        assert_eq!(session.selection().get(name()), Some(OptionKey::Combined));
        assert_eq!(session.base(), Some(MemberId::new(1)));
    }

    #[test]
    fn selection_survives_rebuild() {
        let session = open(vec![member(1, "A"), member(2, "B"), member(3, "C")]);
        session.select(name(), OptionKey::Member(MemberId::new(2))).unwrap();

        session.rebuild(vec![member(2, "B"), member(3, "C")]).unwrap();
        assert_eq!(session.selection().get(name()), Some(OptionKey::Member(MemberId::new(2))));

        session.rebuild(vec![member(1, "A"), member(3, "C")]).unwrap();
        assert_eq!(session.selection().get(name()), Some(OptionKey::Combined));
    }

    #[test]
    fn rebuild_resets_missing_base() {
        let session = open(vec![member(1, "A"), member(2, "B")]);
        session.set_base(MemberId::new(2)).unwrap();
        session.rebuild(vec![member(1, "A")]).unwrap();
        assert_eq!(session.base(), Some(MemberId::new(1)));
    }

    #[test]
    fn unknown_selection_is_rejected() {
        let session = open(vec![member(1, "A")]);
        let err = session.select(name(), OptionKey::Combined).unwrap_err();
        assert!(matches!(err, SessionError::Selection(_)));
        let err = session.set_base(MemberId::new(9)).unwrap_err();
        assert!(matches!(err, SessionError::UnknownMember(_)));
    }

    #[test]
    fn preview_uses_chosen_base() {
        let session = open(vec![member(1, "A"), member(2, "B")]);
        session.set_base(MemberId::new(2)).unwrap();
        session.select(name(), OptionKey::Member(MemberId::new(1))).unwrap();

        let cs = session.preview().unwrap();
        assert!(cs.member.id.is_unpersisted());
        assert_eq!(cs.member.name, "m2.jpg");
        assert_eq!(cs.entity_values[0].content_hash, ContentHash::of_bytes(b"m2"));
        assert_eq!(cs.entity_values[0].value, PropertyValue::text("A"));
    }

    #[test]
    fn empty_cluster_cannot_commit() {
        let session = open(Vec::new());
        assert!(session.rows().is_empty());
        assert!(matches!(session.preview(), Err(SessionError::EmptyCluster)));
    }

    #[tokio::test]
    async fn successful_submit_closes_session() {
        let store = InMemoryChangeSetStore::starting_at(50);
        let session = open(vec![member(1, "A"), member(2, "B")]);

        let receipt = session.submit(&store).await.unwrap();
        assert_eq!(receipt.member, MemberId::new(50));
        assert!(!session.is_open());
        assert!(session.rows().is_empty());
        assert!(session.selection().is_empty());
        assert!(!session.is_submitting());
        assert!(matches!(session.submit(&store).await, Err(SessionError::Closed)));
        assert_eq!(store.persisted()[0].entity_values[0].value, PropertyValue::text("A — B"));
    }

    #[tokio::test]
    async fn failed_submit_keeps_state_for_retry() {
        let store = InMemoryChangeSetStore::new();
        store.set_read_only(true);
        let session = open(vec![member(1, "A"), member(2, "B")]);
        session.select(name(), OptionKey::Member(MemberId::new(2))).unwrap();
        let before = session.selection();

        let err = session.submit(&store).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(session.is_open());
        assert!(!session.is_submitting());
        assert_eq!(session.selection(), before);

        store.set_read_only(false);
        let receipt = session.submit(&store).await.unwrap();
        assert_eq!(receipt.entity_values, 1);
        assert_eq!(store.persisted()[0].entity_values[0].value, PropertyValue::text("B"));
    }

    struct GatedStore {
        gate: Notify,
        calls: AtomicUsize,
        inner: InMemoryChangeSetStore,
    }

    #[async_trait]
    impl ChangeSetStore for GatedStore {
        async fn submit(&self, change_set: &ChangeSet) -> StoreResult<SubmitReceipt> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            self.inner.submit(change_set).await
        }
    }

    #[tokio::test]
    async fn concurrent_submit_is_rejected() {
        let store = GatedStore {
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
            inner: InMemoryChangeSetStore::new(),
        };
        let session = open(vec![member(1, "A"), member(2, "B")]);

        let first = session.submit(&store);
        let second = async {
            tokio::task::yield_now().await;
            assert!(session.is_submitting());
            let result = session.submit(&store).await;
            store.gate.notify_one();
            result
        };
        let (first, second) = tokio::join!(first, second);

        assert!(first.is_ok());
        assert!(matches!(second, Err(SessionError::SubmitInProgress)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.inner.len(), 1);
    }
}
