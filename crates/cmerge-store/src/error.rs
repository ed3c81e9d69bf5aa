use cmerge_types::MemberId;

/// Errors from change-set persistence.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend refused the change-set.
    #[error("change-set rejected: {0}")]
    Rejected(String),

    /// The change-set's member already carries a persisted id.
    #[error("member {0} is already persisted")]
    AlreadyPersisted(MemberId),

    /// Storage backend is read-only or otherwise unavailable.
    #[error("store is read-only")]
    ReadOnly,

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
