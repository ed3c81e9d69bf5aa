//! Value normalizer for cluster merging.
//!
//! Canonicalizes property values into keys usable for equality comparison
//! and renders them as human-readable text. Both functions are pure.
//!
//! # Key Types
//!
//! - [`ComparableKey`] -- Equality key (absent values get a dedicated key)
//! - [`BooleanLabels`] -- Presentation labels for checkbox values

pub mod canonical;
pub mod display;

pub use canonical::{canonical, ComparableKey};
pub use display::{display, display_with, BooleanLabels};
