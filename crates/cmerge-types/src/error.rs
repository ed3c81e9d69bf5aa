use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("empty content hash")]
    EmptyHash,
}
