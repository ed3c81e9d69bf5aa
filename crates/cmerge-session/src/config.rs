use std::path::Path;

use cmerge_normalize::BooleanLabels;
use cmerge_rows::{RowConfig, DEFAULT_SEPARATOR};
use serde::{Deserialize, Serialize};

use crate::error::SessionResult;

/// Configuration for merge sessions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Separator between rendered values in a combined text value.
    pub separator: String,
    /// Sort combined tag unions instead of keeping member order.
    pub sort_combined_tags: bool,
    /// Label for a checked checkbox.
    pub yes_label: String,
    /// Label for an unchecked checkbox.
    pub no_label: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        let labels = BooleanLabels::default();
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            sort_combined_tags: false,
            yes_label: labels.yes,
            no_label: labels.no,
        }
    }
}

impl MergeConfig {
    /// Parse from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> SessionResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SessionResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Settings handed to the row builder.
    pub fn row_config(&self) -> RowConfig {
        RowConfig {
            separator: self.separator.clone(),
            sort_combined_tags: self.sort_combined_tags,
            labels: BooleanLabels::new(self.yes_label.clone(), self.no_label.clone()),
        }
    }
}
