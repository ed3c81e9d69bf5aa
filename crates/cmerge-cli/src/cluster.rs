use std::path::Path;

use anyhow::Context;
use cmerge_types::{Member, PropertySchema};
use serde::{Deserialize, Serialize};

/// A cluster as exported by the host catalog: its members and the full
/// property schema list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClusterFile {
    pub members: Vec<Member>,
    pub schemas: Vec<PropertySchema>,
}

impl ClusterFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading cluster file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing cluster file {}", path.display()))
    }
}
