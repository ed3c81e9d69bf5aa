use cmerge_types::{ContentHash, Member, MemberId, PropertyId, PropertyValue};
use serde::{Deserialize, Serialize};

/// A resolved value addressed to one member occurrence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceValue {
    pub property: PropertyId,
    pub member: MemberId,
    pub value: PropertyValue,
}

/// A resolved value addressed to shared content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityValue {
    pub property: PropertyId,
    pub content_hash: ContentHash,
    pub value: PropertyValue,
}

/// The merged record plus its resolved property values, ready to persist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Synthesized member; its id is [`MemberId::UNPERSISTED`].
    pub member: Member,
    pub instance_values: Vec<InstanceValue>,
    pub entity_values: Vec<EntityValue>,
}

impl ChangeSet {
    /// Total number of resolved values.
    pub fn len(&self) -> usize {
        self.instance_values.len() + self.entity_values.len()
    }

    /// Returns `true` if no property resolved to a value.
    pub fn is_empty(&self) -> bool {
        self.instance_values.is_empty() && self.entity_values.is_empty()
    }

    /// The resolved value for `property`, from whichever list holds it.
    pub fn value_for(&self, property: PropertyId) -> Option<&PropertyValue> {
        self.instance_values
            .iter()
            .find(|v| v.property == property)
            .map(|v| &v.value)
            .or_else(|| {
                self.entity_values
                    .iter()
                    .find(|v| v.property == property)
                    .map(|v| &v.value)
            })
    }
}
