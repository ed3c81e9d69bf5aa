use std::collections::BTreeSet;

use cmerge_normalize::{canonical, display_with, BooleanLabels};
use cmerge_types::{Member, PropertySchema, PropertyValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::combine::{combine, DEFAULT_SEPARATOR};
use crate::row::{MergeOption, MergeRow, OptionKey};
use crate::selection::SelectionState;

/// Settings that shape combined values and option labels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowConfig {
    /// Placed between rendered values when combining non-tag properties.
    pub separator: String,
    /// Sort the combined tag union instead of keeping first-seen order.
    pub sort_combined_tags: bool,
    /// Labels used to render checkbox values.
    pub labels: BooleanLabels,
}

impl Default for RowConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            sort_combined_tags: false,
            labels: BooleanLabels::default(),
        }
    }
}

/// Build one merge row per mergeable property that at least one member
/// holds a value for.
///
/// Rows come out in `schemas` order. The returned selection holds exactly one
/// key per row: the `prior` key when it still names an option on the row,
/// otherwise the row's default (combined on conflict, else the sole option).
/// An empty `members` slice yields no rows.
pub fn build_rows(
    members: &[Member],
    schemas: &[PropertySchema],
    prior: &SelectionState,
    config: &RowConfig,
) -> (Vec<MergeRow>, SelectionState) {
    let mut rows = Vec::new();
    let mut selection = SelectionState::new();

    for schema in schemas {
        if !schema.is_mergeable() {
            trace!(property = %schema.id, kind = ?schema.kind, "property not mergeable");
            continue;
        }
        let Some(row) = build_row(members, schema, config) else {
            trace!(property = %schema.id, "no member holds a value");
            continue;
        };

        let key = match prior.get(schema.id) {
            Some(key) if row.has_option(&key) => Some(key),
            _ => row.default_key(),
        };
        if let Some(key) = key {
            selection.set(schema.id, key);
        }

        debug!(
            property = %schema.id,
            options = row.options.len(),
            conflict = row.conflict,
            selected = ?key,
            "built merge row"
        );
        rows.push(row);
    }

    debug!(
        members = members.len(),
        rows = rows.len(),
        conflicts = rows.iter().filter(|r| r.conflict).count(),
        "merge rows built"
    );
    (rows, selection)
}

fn build_row(members: &[Member], schema: &PropertySchema, config: &RowConfig) -> Option<MergeRow> {
    let defined: Vec<(&Member, &PropertyValue)> = members
        .iter()
        .filter_map(|m| m.value(schema.id).map(|v| (m, v)))
        .collect();
    if defined.is_empty() {
        return None;
    }

    let mut options: Vec<MergeOption> = defined
        .iter()
        .map(|(member, value)| MergeOption {
            key: OptionKey::Member(member.id),
            source: Some(member.id),
            value: (*value).clone(),
            label: display_with(Some(*value), schema, &config.labels),
        })
        .collect();

    let distinct: BTreeSet<_> = defined
        .iter()
        .map(|(_, value)| canonical(Some(*value), schema))
        .collect();
    let conflict = distinct.len() > 1;

    if conflict {
        let values: Vec<&PropertyValue> = defined.iter().map(|(_, v)| *v).collect();
        let value = combine(&values, schema, config);
        options.push(MergeOption {
            key: OptionKey::Combined,
            source: None,
            label: display_with(Some(&value), schema, &config.labels),
            value,
        });
    }

    Some(MergeRow {
        property: schema.clone(),
        options,
        conflict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmerge_types::{ContentHash, MemberId, PropertyId, PropertyScope, PropertyType, TagId};
    use proptest::prelude::*;

    fn member(id: i64) -> Member {
        Member::new(id, ContentHash::of_bytes(format!("m{id}").as_bytes()), format!("m{id}.jpg"))
    }

    fn text_schema(id: i64, name: &str) -> PropertySchema {
        PropertySchema::new(id, name, PropertyType::Text, PropertyScope::Entity)
    }

    fn key(id: i64) -> OptionKey {
        OptionKey::Member(MemberId::new(id))
    }

    fn build(members: &[Member], schemas: &[PropertySchema]) -> (Vec<MergeRow>, SelectionState) {
        build_rows(members, schemas, &SelectionState::new(), &RowConfig::default())
    }

    #[test]
    fn conflicting_text_offers_combined_option() {
        let members = vec![
            member(1).with_property(2, PropertyValue::text("A")),
            member(2).with_property(2, PropertyValue::text("B")),
        ];
        let (rows, sel) = build(&members, &[text_schema(2, "name")]);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert!(row.conflict);
        let keys: Vec<String> = row.options.iter().map(|o| o.key.to_string()).collect();
        assert_eq!(keys, vec!["1", "2", "combined"]);
        assert_eq!(row.options[2].value, PropertyValue::text("A — B"));
        assert_eq!(row.options[2].source, None);
        assert_eq!(sel.get(PropertyId::new(2)), Some(OptionKey::Combined));
    }

    #[test]
    fn agreeing_members_have_no_conflict() {
        let members = vec![
            member(1).with_property(2, PropertyValue::text("same")),
            member(2).with_property(2, PropertyValue::text("same")),
        ];
        let (rows, sel) = build(&members, &[text_schema(2, "name")]);
        assert!(!rows[0].conflict);
        assert_eq!(rows[0].options.len(), 2);
        assert!(rows[0].combined().is_none());
        assert_eq!(sel.get(PropertyId::new(2)), Some(key(1)));
    }

    #[test]
    fn opposite_infinities_conflict() {
        let schema = PropertySchema::new(5, "score", PropertyType::Numeric, PropertyScope::Instance);
        let members = vec![
            member(1).with_property(5, PropertyValue::Numeric(f64::INFINITY)),
            member(2).with_property(5, PropertyValue::Numeric(f64::NEG_INFINITY)),
        ];
        let (rows, sel) = build(&members, &[schema]);
        assert!(rows[0].conflict);
        assert_eq!(rows[0].combined().map(|o| o.label.as_str()), Some("inf — -inf"));
        assert_eq!(sel.get(PropertyId::new(5)), Some(OptionKey::Combined));
    }

    #[test]
    fn signed_zeros_agree() {
        let schema = PropertySchema::new(5, "score", PropertyType::Numeric, PropertyScope::Instance);
        let members = vec![
            member(1).with_property(5, PropertyValue::Numeric(0.0)),
            member(2).with_property(5, PropertyValue::Numeric(-0.0)),
        ];
        let (rows, sel) = build(&members, &[schema]);
        assert!(!rows[0].conflict);
        assert!(rows[0].combined().is_none());
        let labels: Vec<&str> = rows[0].options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["0", "0"]);
        assert_eq!(sel.get(PropertyId::new(5)), Some(key(1)));
    }

    #[test]
    fn reordered_tags_do_not_conflict() {
        let schema = PropertySchema::new(4, "tags", PropertyType::MultiTag, PropertyScope::Entity);
        let members = vec![
            member(1).with_property(4, PropertyValue::tags(["a", "b"])),
            member(2).with_property(4, PropertyValue::tags(["b", "a"])),
        ];
        let (rows, _) = build(&members, &[schema]);
        assert!(!rows[0].conflict);
    }

    #[test]
    fn conflicting_tags_combine_into_union() {
        let schema = PropertySchema::new(4, "tags", PropertyType::MultiTag, PropertyScope::Entity);
        let members = vec![
            member(1).with_property(4, PropertyValue::tags([1u64, 2])),
            member(2).with_property(4, PropertyValue::tags([2u64, 3])),
        ];
        let (rows, _) = build(&members, &[schema]);
        let combined = rows[0].combined().unwrap();
        assert_eq!(
            combined.value.tag_ids(),
            &[TagId::from(1u64), TagId::from(2u64), TagId::from(3u64)]
        );
    }

    #[test]
    fn absent_values_are_skipped() {
        let members = vec![
            member(1),
            member(2).with_property(2, PropertyValue::text("only")),
        ];
        let (rows, sel) = build(&members, &[text_schema(2, "name"), text_schema(3, "empty")]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].options.len(), 1);
        assert!(!rows[0].conflict);
        assert_eq!(sel.get(PropertyId::new(2)), Some(key(2)));
        assert_eq!(sel.get(PropertyId::new(3)), None);
    }

    #[test]
    fn non_mergeable_schemas_are_excluded() {
        let schemas = vec![
            text_schema(0, "reserved"),
            text_schema(5, "computed").computed(),
            PropertySchema::new(6, "width", PropertyType::Width, PropertyScope::Entity),
            PropertySchema::new(7, "folder", PropertyType::Folder, PropertyScope::Instance),
        ];
        let mut m = member(1);
        for id in [0, 5, 6, 7] {
            m = m.with_property(id, PropertyValue::text("x"));
        }
        let (rows, sel) = build(&[m], &schemas);
        assert!(rows.is_empty());
        assert!(sel.is_empty());
    }

    #[test]
    fn rows_follow_schema_order() {
        let schemas = vec![text_schema(9, "z"), text_schema(3, "a"), text_schema(6, "m")];
        let m = member(1)
            .with_property(3, PropertyValue::text("a"))
            .with_property(6, PropertyValue::text("m"))
            .with_property(9, PropertyValue::text("z"));
        let (rows, _) = build(&[m], &schemas);
        let ids: Vec<i64> = rows.iter().map(|r| r.property.id.get()).collect();
        assert_eq!(ids, vec![9, 3, 6]);
    }

    #[test]
    fn prior_selection_survives_rebuild() {
        let members = vec![
            member(1).with_property(2, PropertyValue::text("A")),
            member(2).with_property(2, PropertyValue::text("B")),
            member(3).with_property(2, PropertyValue::text("C")),
        ];
        let schemas = [text_schema(2, "name")];
        let mut prior = SelectionState::new();
        prior.set(PropertyId::new(2), key(2));

        let (_, sel) = build_rows(&members, &schemas, &prior, &RowConfig::default());
        assert_eq!(sel.get(PropertyId::new(2)), Some(key(2)));

        // Member 2 leaves the cluster; the stale key falls back to the default.
        let (_, sel) = build_rows(&members[..1], &schemas, &prior, &RowConfig::default());
        assert_eq!(sel.get(PropertyId::new(2)), Some(key(1)));

        let shrunk = vec![members[0].clone(), members[2].clone()];
        let (_, sel) = build_rows(&shrunk, &schemas, &prior, &RowConfig::default());
        assert_eq!(sel.get(PropertyId::new(2)), Some(OptionKey::Combined));
    }

    #[test]
    fn empty_cluster_builds_nothing() {
        let (rows, sel) = build(&[], &[text_schema(2, "name")]);
        assert!(rows.is_empty());
        assert!(sel.is_empty());
    }

    #[test]
    fn single_member_rows_are_preselected() {
        let m = member(1)
            .with_property(2, PropertyValue::text("A"))
            .with_property(3, PropertyValue::Numeric(3.0));
        let schemas = vec![
            text_schema(2, "name"),
            PropertySchema::new(3, "rating", PropertyType::Numeric, PropertyScope::Instance),
        ];
        let (rows, sel) = build(&[m], &schemas);
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert!(!row.conflict);
            assert_eq!(row.options.len(), 1);
            assert_eq!(row.selected(&sel).map(|o| o.key), Some(key(1)));
        }
    }

    #[test]
    fn labels_render_tag_names() {
        let schema = PropertySchema::new(4, "tags", PropertyType::MultiTag, PropertyScope::Entity)
            .with_tag("1", cmerge_types::TagDescriptor::new("Beach"))
            .with_tag("2", cmerge_types::TagDescriptor::new("Dog"));
        let members = vec![
            member(1).with_property(4, PropertyValue::tags(["1"])),
            member(2).with_property(4, PropertyValue::tags(["2"])),
        ];
        let (rows, _) = build(&members, &[schema]);
        let labels: Vec<&str> = rows[0].options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Beach", "Dog", "Beach, Dog"]);
    }

    fn value_strategy() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[ab]")
    }

    proptest! {
        #[test]
        fn row_exists_iff_some_value_defined(values in proptest::collection::vec(value_strategy(), 0..6)) {
            let members: Vec<Member> = values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let m = member(i as i64 + 1);
                    match v {
                        Some(s) => m.with_property(2, PropertyValue::text(s.clone())),
                        None => m,
                    }
                })
                .collect();
            let (rows, _) = build(&members, &[text_schema(2, "name")]);

            let defined: BTreeSet<&String> = values.iter().flatten().collect();
            prop_assert_eq!(rows.len(), usize::from(!defined.is_empty()));
            if let Some(row) = rows.first() {
                prop_assert_eq!(row.conflict, defined.len() > 1);
                prop_assert_eq!(row.combined().is_some(), row.conflict);
            }
        }
    }
}
