//! Row builder for cluster merging.
//!
//! For each mergeable property, collects every member's value, detects
//! whether the members disagree, and offers one option per member plus a
//! combined option when they do. The caller owns the [`SelectionState`] and
//! passes it back in on every rebuild so earlier choices survive.
//!
//! # Key Types
//!
//! - [`MergeRow`] / [`MergeOption`] / [`OptionKey`] -- One property's resolution surface
//! - [`SelectionState`] -- Chosen option per property
//! - [`RowConfig`] -- Combination settings

pub mod builder;
pub mod combine;
pub mod error;
pub mod row;
pub mod selection;

pub use builder::{build_rows, RowConfig};
pub use combine::{combine, DEFAULT_SEPARATOR};
pub use error::{RowError, RowResult};
pub use row::{MergeOption, MergeRow, OptionKey};
pub use selection::SelectionState;
