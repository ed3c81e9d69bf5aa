use std::fmt;
use std::str::FromStr;

use cmerge_types::{MemberId, PropertySchema, PropertyValue};
use serde::{Deserialize, Serialize};

use crate::error::RowError;
use crate::selection::SelectionState;

const COMBINED: &str = "combined";

/// Key identifying one option within a row.
///
/// The string form is the member id, or `combined` for the synthesized
/// option. It round-trips through [`FromStr`] and serde.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OptionKey {
    /// Keep the value held by this member.
    Member(MemberId),
    /// Use the combined value.
    Combined,
}

impl OptionKey {
    pub fn is_combined(&self) -> bool {
        matches!(self, Self::Combined)
    }
}

impl fmt::Debug for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OptionKey({self})")
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member(id) => write!(f, "{id}"),
            Self::Combined => f.write_str(COMBINED),
        }
    }
}

impl FromStr for OptionKey {
    type Err = RowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == COMBINED {
            return Ok(Self::Combined);
        }
        s.parse::<MemberId>()
            .map(Self::Member)
            .map_err(|_| RowError::InvalidKey(s.to_string()))
    }
}

impl TryFrom<String> for OptionKey {
    type Error = RowError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<OptionKey> for String {
    fn from(key: OptionKey) -> Self {
        key.to_string()
    }
}

impl From<MemberId> for OptionKey {
    fn from(id: MemberId) -> Self {
        Self::Member(id)
    }
}

/// One selectable value for a property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MergeOption {
    pub key: OptionKey,
    /// Member the value came from; `None` for the combined option.
    pub source: Option<MemberId>,
    pub value: PropertyValue,
    /// Rendered form of `value`.
    pub label: String,
}

impl MergeOption {
    pub fn is_combined(&self) -> bool {
        self.key.is_combined()
    }
}

/// One property's resolution surface.
///
/// A row is only built when at least one member holds a value, so
/// `options` is never empty. The combined option, when present, is last.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MergeRow {
    pub property: PropertySchema,
    pub options: Vec<MergeOption>,
    pub conflict: bool,
}

impl MergeRow {
    /// Find an option by key.
    pub fn option(&self, key: &OptionKey) -> Option<&MergeOption> {
        self.options.iter().find(|o| o.key == *key)
    }

    pub fn has_option(&self, key: &OptionKey) -> bool {
        self.option(key).is_some()
    }

    /// The combined option, if the row is in conflict.
    pub fn combined(&self) -> Option<&MergeOption> {
        self.options.last().filter(|o| o.is_combined())
    }

    /// The option currently chosen in `selection`.
    pub fn selected<'a>(&'a self, selection: &SelectionState) -> Option<&'a MergeOption> {
        selection
            .get(self.property.id)
            .and_then(|key| self.option(&key))
    }

    /// Key chosen when no earlier choice applies: combined on conflict,
    /// otherwise the first option.
    pub fn default_key(&self) -> Option<OptionKey> {
        if self.conflict {
            self.combined().map(|o| o.key)
        } else {
            self.options.first().map(|o| o.key)
        }
    }
}
