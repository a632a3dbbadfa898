//! Runtime configuration for a catalog instance.
//!
//! Hosts pass configuration as JSON; every field has a default so `{}` is a
//! valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{StoreError, StoreResult};

/// Key under which the serialized category tree is stored.
pub const DEFAULT_CATALOG_KEY: &str = "debateCategories";

/// 10 MiB, ample for a catalog of tens of categories plus a user library.
pub const DEFAULT_MAP_SIZE: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Name of the LMDB environment; the directory `<db_name>.lmdb` is created.
    pub db_name: String,
    pub map_size_bytes: usize,
    pub catalog_key: String,
    /// Maximum characters of a stance summary shown in previews.
    pub preview_summary_chars: usize,
    /// Overwrite an unparsable stored catalog with the seed dataset.
    pub persist_seed_on_corruption: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_name: "debate_catalog".to_string(),
            map_size_bytes: DEFAULT_MAP_SIZE,
            catalog_key: DEFAULT_CATALOG_KEY.to_string(),
            preview_summary_chars: 160,
            persist_seed_on_corruption: true,
        }
    }
}

impl CoreConfig {
    pub fn with_db_name(name: impl Into<String>) -> Self {
        Self {
            db_name: name.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(StoreError::Io)?;
        Self::from_json_str(&raw)
    }

    /// Directory holding the LMDB environment.
    pub fn lmdb_dir(&self) -> String {
        format!("{}.lmdb", self.db_name)
    }
}
