use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const SCHEMA_VERSION: u32 = 1;

/// On-disk image of the local key-value store. Values are opaque strings; the
/// recent-topic lists inside are themselves JSON-encoded arrays.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalStorageData {
    pub schema_version: u32,
    #[serde(default)]
    pub items: BTreeMap<String, String>,
}

impl Default for LocalStorageData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            items: BTreeMap::new(),
        }
    }
}

impl LocalStorageData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}
