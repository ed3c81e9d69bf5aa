use cmerge_rows::{MergeRow, SelectionState};
use cmerge_types::{Member, MemberId, PropertyScope};
use tracing::debug;

use crate::change_set::{ChangeSet, EntityValue, InstanceValue};

/// Build the change-set for the chosen resolutions.
///
/// The new member is a copy of `base` carrying [`MemberId::UNPERSISTED`].
/// A row whose selected key names no option on the row is left out, so the
/// merged record simply has no value for that property.
pub fn build_change_set(base: &Member, rows: &[MergeRow], selection: &SelectionState) -> ChangeSet {
    let member = Member {
        id: MemberId::UNPERSISTED,
        ..base.clone()
    };
    let mut instance_values = Vec::new();
    let mut entity_values = Vec::new();

    for row in rows {
        let property = row.property.id;
        let Some(option) = row.selected(selection) else {
            debug!(%property, key = ?selection.get(property), "no matching option; property omitted");
            continue;
        };
        let value = option.value.clone();
        match row.property.scope {
            PropertyScope::Instance => instance_values.push(InstanceValue {
                property,
                member: member.id,
                value,
            }),
            PropertyScope::Entity => entity_values.push(EntityValue {
                property,
                content_hash: member.content_hash.clone(),
                value,
            }),
        }
    }

    debug!(
        base = %base.id,
        instance_values = instance_values.len(),
        entity_values = entity_values.len(),
        "change-set built"
    );
    ChangeSet {
        member,
        instance_values,
        entity_values,
    }
}
