//! Foundation types for merging a cluster of duplicate records.
//!
//! Every other `cmerge` crate depends on `cmerge-types`. The types here are
//! read-only inputs to the merge engine: members are never mutated, and
//! schemas are supplied fresh by the caller each time a cluster is opened.
//!
//! # Key Types
//!
//! - [`PropertyId`] / [`MemberId`] / [`TagId`] — Identifiers
//! - [`ContentHash`] — Address of the content shared by duplicate members
//! - [`PropertySchema`] — Typed attribute definition with its storage scope
//! - [`PropertyValue`] — Closed set of value shapes a property can hold
//! - [`Member`] — One record participating in a cluster

pub mod error;
pub mod identity;
pub mod member;
pub mod schema;
pub mod value;

pub use error::TypeError;
pub use identity::{ContentHash, MemberId, PropertyId, TagId};
pub use member::Member;
pub use schema::{PropertySchema, PropertyScope, PropertyType, TagDescriptor};
pub use value::{Color, PropertyValue};
