use cmerge_types::MemberId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cluster has no members")]
    EmptyCluster,

    #[error("merge session is closed")]
    Closed,

    #[error("a submit is already in progress")]
    SubmitInProgress,

    #[error("member {0} is not part of the cluster")]
    UnknownMember(MemberId),

    #[error("submit failed: {0}")]
    SubmitFailed(#[source] cmerge_store::StoreError),

    #[error("selection error: {0}")]
    Selection(#[from] cmerge_rows::RowError),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// Whether the caller may retry the same operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SubmitFailed(_) | Self::SubmitInProgress)
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
