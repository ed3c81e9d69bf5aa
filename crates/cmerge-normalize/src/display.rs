//! Human-readable rendering of property values.

use cmerge_types::{PropertySchema, PropertyValue, TagId};
use serde::{Deserialize, Serialize};

/// Separator between items of a rendered list.
pub const LIST_SEPARATOR: &str = ", ";

/// Labels used to render checkbox values.
///
/// Localization belongs to the presentation layer; callers inject the
/// strings they want here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanLabels {
    pub yes: String,
    pub no: String,
}

impl BooleanLabels {
    pub fn new(yes: impl Into<String>, no: impl Into<String>) -> Self {
        Self {
            yes: yes.into(),
            no: no.into(),
        }
    }

    pub fn label(&self, value: bool) -> &str {
        if value {
            &self.yes
        } else {
            &self.no
        }
    }
}

impl Default for BooleanLabels {
    fn default() -> Self {
        Self::new("Yes", "No")
    }
}

/// Render a value with the default checkbox labels.
pub fn display(value: Option<&PropertyValue>, schema: &PropertySchema) -> String {
    display_with(value, schema, &BooleanLabels::default())
}

/// Render a value as text. Absent values render as the empty string.
pub fn display_with(
    value: Option<&PropertyValue>,
    schema: &PropertySchema,
    labels: &BooleanLabels,
) -> String {
    let Some(value) = value else {
        return String::new();
    };
    match value {
        PropertyValue::Text(s) => s.clone(),
        PropertyValue::Checkbox(b) => labels.label(*b).to_string(),
        PropertyValue::Color(c) => c.to_string(),
        PropertyValue::Numeric(n) => format_number(*n),
        PropertyValue::Date(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
        PropertyValue::TagRef(id) => tag_name(schema, id),
        PropertyValue::TagRefList(ids) => ids
            .iter()
            .map(|id| tag_name(schema, id))
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR),
    }
}

fn tag_name(schema: &PropertySchema, id: &TagId) -> String {
    schema
        .tag(id)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn format_number(n: f64) -> String {
    let n = if n == 0.0 { 0.0 } else { n };
    // Whole numbers render without a trailing ".0".
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}
