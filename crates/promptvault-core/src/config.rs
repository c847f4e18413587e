//! Runtime configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::diff::DiffOptions;
use crate::error::VaultResult;

/// Configuration for opening a [`crate::Vault`].
///
/// All fields have defaults, so a partial JSON document (or `{}`) is a valid
/// configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// SQLite database file. `None` selects an in-memory database.
    pub database_path: Option<PathBuf>,
    /// Unchanged context lines kept around changes in generated diffs.
    pub context_lines: usize,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            context_lines: 3,
        }
    }
}

impl VaultConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> VaultResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Default diff options derived from this configuration.
    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            context_lines: self.context_lines,
            ..Default::default()
        }
    }
}
