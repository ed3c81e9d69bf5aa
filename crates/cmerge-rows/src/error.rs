//! Error types for the row crate.

use cmerge_types::PropertyId;

use crate::row::OptionKey;

/// Errors raised when applying a user selection to built rows.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RowError {
    /// No row exists for the property.
    #[error("no merge row for property {0}")]
    UnknownProperty(PropertyId),

    /// The row exists but has no option with this key.
    #[error("property {property} has no option {key}")]
    UnknownOption { property: PropertyId, key: OptionKey },

    /// An option key string could not be parsed.
    #[error("invalid option key: {0}")]
    InvalidKey(String),
}

/// Convenience alias for row results.
pub type RowResult<T> = Result<T, RowError>;
