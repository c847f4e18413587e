//! Top-level entry point wiring storage and services together.

use std::sync::Arc;

use tracing::info;

use crate::config::VaultConfig;
use crate::control::VersionControl;
use crate::error::VaultResult;
use crate::locks::IdLocks;
use crate::storage::SqliteStorage;
use crate::store::PromptStore;

/// A prompt vault backed by SQLite.
///
/// Both services share one storage handle and one lock registry, so prompt
/// updates and rollbacks against the same prompt serialize with each other.
pub struct Vault {
    store: PromptStore<SqliteStorage>,
    control: VersionControl<SqliteStorage>,
}

impl Vault {
    /// Open a vault according to `config`.
    pub fn open(config: &VaultConfig) -> VaultResult<Self> {
        let storage = match &config.database_path {
            Some(path) => SqliteStorage::new(path)?,
            None => SqliteStorage::in_memory()?,
        };
        let storage = Arc::new(storage);
        let locks = IdLocks::new();

        let store = PromptStore::with_locks(Arc::clone(&storage), locks.clone());
        let control = VersionControl::with_locks(storage, locks, config.diff_options());

        info!(
            database = %config
                .database_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| ":memory:".to_string()),
            "Opened vault"
        );
        Ok(Self { store, control })
    }

    /// Open an in-memory vault with default options.
    pub fn open_in_memory() -> VaultResult<Self> {
        Self::open(&VaultConfig::default())
    }

    /// Prompt lifecycle operations.
    pub fn store(&self) -> &PromptStore<SqliteStorage> {
        &self.store
    }

    /// Version history, rollback, and comparison operations.
    pub fn control(&self) -> &VersionControl<SqliteStorage> {
        &self.control
    }
}
