//! Synthesis of a combined value from conflicting member values.
//!
//! Tag-typed properties combine into a tag list (the union of every
//! referenced tag). All other property types combine into text: the rendered
//! values joined by a separator. That text is stored verbatim as the
//! property's new value, so a numeric or date property resolved through the
//! combined option becomes a text value.

use std::collections::HashSet;

use cmerge_normalize::display_with;
use cmerge_types::{PropertySchema, PropertyValue, TagId};

use crate::builder::RowConfig;

/// Separator placed between rendered values in a combined text value.
pub const DEFAULT_SEPARATOR: &str = " — ";

/// Combine defined member values into one value.
///
/// `values` is in member order. For tag properties the union keeps
/// first-seen order unless `config.sort_combined_tags` is set.
pub fn combine(values: &[&PropertyValue], schema: &PropertySchema, config: &RowConfig) -> PropertyValue {
    if schema.kind.is_tag() {
        let mut seen: HashSet<&TagId> = HashSet::new();
        let mut union: Vec<TagId> = Vec::new();
        for id in values.iter().flat_map(|v| v.tag_ids()) {
            if seen.insert(id) {
                union.push(id.clone());
            }
        }
        if config.sort_combined_tags {
            union.sort();
        }
        return PropertyValue::TagRefList(union);
    }

    let joined = values
        .iter()
        .map(|v| display_with(Some(*v), schema, &config.labels))
        .collect::<Vec<_>>()
        .join(config.separator.as_str());
    PropertyValue::Text(joined)
}
