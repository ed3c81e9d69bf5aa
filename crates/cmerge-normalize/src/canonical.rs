//! Canonical comparison keys.
//!
//! Each encoding is prefixed with a domain tag so that keys produced by
//! different rules can never collide.

use std::fmt;

use chrono::SecondsFormat;
use cmerge_types::{PropertySchema, PropertyValue};

/// Equality key for a property value.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComparableKey {
    /// The member has no value for the property.
    Absent,
    /// Canonical encoding of a defined value.
    Encoded(String),
}

impl ComparableKey {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl fmt::Debug for ComparableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "ComparableKey(absent)"),
            Self::Encoded(s) => write!(f, "ComparableKey({s})"),
        }
    }
}

/// Canonicalize a value for equality comparison.
///
/// - Tag lists are sorted before encoding, so `[a, b]` and `[b, a]` are equal.
/// - Dates encode as RFC 3339 UTC with millisecond precision.
/// - Colors encode as their textual form, so equal colors with different
///   alpha representations compare equal.
/// - Numbers encode through `Debug`, which keeps infinities and NaN apart.
///   Negative zero equals zero.
/// - Everything else uses the tagged JSON encoding of the value.
pub fn canonical(value: Option<&PropertyValue>, _schema: &PropertySchema) -> ComparableKey {
    let Some(value) = value else {
        return ComparableKey::Absent;
    };
    let encoded = match value {
        PropertyValue::TagRefList(ids) => {
            let mut sorted: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
            sorted.sort_unstable();
            format!("tags:{}", json_or_debug(&sorted))
        }
        PropertyValue::Date(at) => {
            format!("date:{}", at.to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        PropertyValue::Color(color) => format!("color:{color}"),
        PropertyValue::Numeric(n) => {
            let n = if *n == 0.0 { 0.0 } else { *n };
            format!("num:{n:?}")
        }
        other => format!("json:{}", json_or_debug(other)),
    };
    ComparableKey::Encoded(encoded)
}

fn json_or_debug<T: serde::Serialize + fmt::Debug>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
}
