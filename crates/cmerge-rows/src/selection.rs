use std::collections::BTreeMap;

use cmerge_types::PropertyId;
use serde::{Deserialize, Serialize};

use crate::error::{RowError, RowResult};
use crate::row::{MergeRow, OptionKey};

/// Chosen option per property.
///
/// Owned by the caller and passed by reference into the row builder, which
/// returns a fresh state reflecting the rebuilt rows. Mutations happen only
/// through [`SelectionState::choose`] and the rebuild.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionState {
    chosen: BTreeMap<PropertyId, OptionKey>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, property: PropertyId) -> Option<OptionKey> {
        self.chosen.get(&property).copied()
    }

    /// Record a key without checking it against any row.
    pub fn set(&mut self, property: PropertyId, key: OptionKey) -> Option<OptionKey> {
        self.chosen.insert(property, key)
    }

    pub fn remove(&mut self, property: PropertyId) -> Option<OptionKey> {
        self.chosen.remove(&property)
    }

    pub fn clear(&mut self) {
        self.chosen.clear();
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, OptionKey)> + '_ {
        self.chosen.iter().map(|(p, k)| (*p, *k))
    }

    /// Choose `key` for `property`, validating it against the built rows.
    pub fn choose(&mut self, rows: &[MergeRow], property: PropertyId, key: OptionKey) -> RowResult<()> {
        let row = rows
            .iter()
            .find(|r| r.property.id == property)
            .ok_or(RowError::UnknownProperty(property))?;
        if !row.has_option(&key) {
            return Err(RowError::UnknownOption { property, key });
        }
        self.chosen.insert(property, key);
        Ok(())
    }
}

impl FromIterator<(PropertyId, OptionKey)> for SelectionState {
    fn from_iter<I: IntoIterator<Item = (PropertyId, OptionKey)>>(iter: I) -> Self {
        Self {
            chosen: iter.into_iter().collect(),
        }
    }
}
