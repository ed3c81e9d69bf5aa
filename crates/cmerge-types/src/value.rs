use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identity::TagId;

/// An RGB color with optional alpha.
///
/// Two colors are the same color when their textual forms match: a missing
/// alpha and a fully opaque alpha both render as `#rrggbb`. Equality and
/// hashing follow the same rule.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: Option<u8>,
}

impl Color {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: None,
        }
    }

    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: Some(alpha),
        }
    }

    /// Alpha channel with a missing value read as fully opaque.
    pub fn opacity(&self) -> u8 {
        self.alpha.unwrap_or(u8::MAX)
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        (self.red, self.green, self.blue, self.opacity())
            == (other.red, other.green, other.blue, other.opacity())
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.red, self.green, self.blue, self.opacity()).hash(state);
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)?;
        match self.alpha {
            Some(alpha) if alpha != u8::MAX => write!(f, "{alpha:02x}"),
            _ => Ok(()),
        }
    }
}

impl FromStr for Color {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypeError::InvalidColor(s.to_string());
        let digits = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize, width: usize| -> Result<u8, TypeError> {
            let raw = &digits[i * width..(i + 1) * width];
            let value = u8::from_str_radix(raw, 16).map_err(|_| invalid())?;
            // Short form `#abc` expands each nibble: a -> aa.
            Ok(if width == 1 { value * 17 } else { value })
        };
        match digits.len() {
            3 => Ok(Self::rgb(channel(0, 1)?, channel(1, 1)?, channel(2, 1)?)),
            6 => Ok(Self::rgb(channel(0, 2)?, channel(1, 2)?, channel(2, 2)?)),
            8 => Ok(Self::rgba(
                channel(0, 2)?,
                channel(1, 2)?,
                channel(2, 2)?,
                channel(3, 2)?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// A property value held by a member.
///
/// Absence is represented by `Option::None` at the call site, never by a
/// variant of this type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Text(String),
    Checkbox(bool),
    Color(Color),
    Numeric(f64),
    Date(DateTime<Utc>),
    TagRef(TagId),
    TagRefList(Vec<TagId>),
}

impl PropertyValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn tags<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TagId>,
    {
        Self::TagRefList(ids.into_iter().map(Into::into).collect())
    }

    /// Tag identifiers referenced by this value; empty for non-tag values.
    pub fn tag_ids(&self) -> &[TagId] {
        match self {
            Self::TagRef(id) => std::slice::from_ref(id),
            Self::TagRefList(ids) => ids,
            _ => &[],
        }
    }

    /// Short name of the value's shape, for logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Checkbox(_) => "checkbox",
            Self::Color(_) => "color",
            Self::Numeric(_) => "numeric",
            Self::Date(_) => "date",
            Self::TagRef(_) => "tag_ref",
            Self::TagRefList(_) => "tag_ref_list",
        }
    }
}
