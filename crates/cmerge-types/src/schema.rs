use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identity::{PropertyId, TagId};

/// The declared type of a property.
///
/// The last six variants are derived from the underlying content by the host
/// system. They are immutable and never offered for merging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Text,
    Checkbox,
    Color,
    SingleTag,
    MultiTag,
    Numeric,
    Date,
    Folder,
    Identity,
    ContentHash,
    PerceptualHash,
    Width,
    Height,
}

impl PropertyType {
    /// Returns `true` for types derived from content (not user-editable).
    pub fn is_derived(self) -> bool {
        matches!(
            self,
            Self::Folder
                | Self::Identity
                | Self::ContentHash
                | Self::PerceptualHash
                | Self::Width
                | Self::Height
        )
    }

    /// Returns `true` for single- and multi-tag types.
    pub fn is_tag(self) -> bool {
        matches!(self, Self::SingleTag | Self::MultiTag)
    }
}

/// Where a property's value is stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyScope {
    /// The value belongs to one specific member occurrence.
    Instance,
    /// The value belongs to the shared content, addressed by content hash.
    Entity,
}

/// Display information for one tag in a tag-typed property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl TagDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
        }
    }
}

/// Immutable description of one attribute shared by all cluster members.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySchema {
    pub id: PropertyId,
    pub name: String,
    pub kind: PropertyType,
    pub scope: PropertyScope,
    #[serde(default)]
    pub computed: bool,
    /// Tag lookup table, populated for tag-typed properties only.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<TagId, TagDescriptor>,
}

impl PropertySchema {
    pub fn new(id: i64, name: impl Into<String>, kind: PropertyType, scope: PropertyScope) -> Self {
        Self {
            id: PropertyId::new(id),
            name: name.into(),
            kind,
            scope,
            computed: false,
            tags: BTreeMap::new(),
        }
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn with_tag(mut self, id: impl Into<TagId>, descriptor: TagDescriptor) -> Self {
        self.tags.insert(id.into(), descriptor);
        self
    }

    /// Whether users may resolve this property when merging.
    ///
    /// Reserved identifiers, computed properties and derived types are
    /// excluded.
    pub fn is_mergeable(&self) -> bool {
        !self.id.is_reserved() && !self.computed && !self.kind.is_derived()
    }

    /// Look up a tag descriptor by identifier.
    pub fn tag(&self, id: &TagId) -> Option<&TagDescriptor> {
        self.tags.get(id)
    }
}
