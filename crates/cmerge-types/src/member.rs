use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identity::{ContentHash, MemberId, PropertyId};
use crate::value::PropertyValue;

/// One record participating in a cluster.
///
/// A property with no entry in `properties` has no value for this member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub content_hash: ContentHash,
    pub name: String,
    #[serde(default)]
    pub properties: BTreeMap<PropertyId, PropertyValue>,
}

impl Member {
    pub fn new(id: i64, content_hash: ContentHash, name: impl Into<String>) -> Self {
        Self {
            id: MemberId::new(id),
            content_hash,
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, property: i64, value: PropertyValue) -> Self {
        self.properties.insert(PropertyId::new(property), value);
        self
    }

    /// This member's value for `property`, if any.
    pub fn value(&self, property: PropertyId) -> Option<&PropertyValue> {
        self.properties.get(&property)
    }
}
