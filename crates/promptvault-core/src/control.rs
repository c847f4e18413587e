//! Version history, rollback, and version comparison.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::diff::{generate_diff, DiffOptions, DiffResult};
use crate::error::{VaultError, VaultResult};
use crate::locks::IdLocks;
use crate::storage::{PromptPatch, Storage};
use crate::types::{Prompt, PromptVersion, VersionStats};

/// Outcome of a rollback: the appended version and the updated prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rollback {
    pub prompt: Prompt,
    pub new_version: PromptVersion,
}

/// Two versions and the diff between their contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionComparison {
    pub version1: PromptVersion,
    pub version2: PromptVersion,
    pub diff: DiffResult,
}

/// Version chain service over a [`Storage`] backend.
///
/// The chain is append-only: rollback restores old content by appending a
/// new version rather than rewriting history.
pub struct VersionControl<S: Storage> {
    storage: Arc<S>,
    locks: IdLocks,
    diff_options: DiffOptions,
}

impl<S: Storage> VersionControl<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_locks(storage, IdLocks::new(), DiffOptions::default())
    }

    /// Build with a shared lock registry and default diff options.
    pub fn with_locks(storage: Arc<S>, locks: IdLocks, diff_options: DiffOptions) -> Self {
        Self {
            storage,
            locks,
            diff_options,
        }
    }

    /// Full version history of a prompt, newest first.
    pub fn version_history(&self, prompt_id: &str) -> VaultResult<Vec<PromptVersion>> {
        self.require_prompt(prompt_id)?;
        let mut versions = self.storage.versions_for_prompt(prompt_id)?;
        versions.reverse();
        Ok(versions)
    }

    /// Look up a single version by id.
    pub fn get_version(&self, version_id: &str) -> VaultResult<PromptVersion> {
        self.storage
            .find_version(version_id)?
            .ok_or_else(|| VaultError::version_not_found(version_id))
    }

    /// Restore the content of an earlier version by appending a new one.
    ///
    /// The target version must belong to `prompt_id`. The new version copies
    /// the target's content, records the target as its source, and becomes
    /// HEAD; the target itself and every other version stay untouched.
    pub fn rollback_to_version(
        &self,
        prompt_id: &str,
        version_id: &str,
        note: Option<String>,
    ) -> VaultResult<Rollback> {
        let lock = self.locks.get(prompt_id);
        let _guard = lock.lock().unwrap();

        let prompt = self.require_prompt(prompt_id)?;
        let target = self.get_version(version_id)?;
        if target.prompt_id != prompt_id {
            return Err(VaultError::wrong_prompt(version_id, prompt_id));
        }

        let new_version = PromptVersion::rollback_of(&prompt, &target, note);
        let patch = PromptPatch {
            content: Some(new_version.content.clone()),
            updated_at: Some(chrono::Utc::now()),
            current_version_id: Some(new_version.id.clone()),
            version_count: Some(new_version.version_number),
            ..Default::default()
        };

        self.storage.transaction(&mut |tx| {
            tx.create_version(&new_version)?;
            tx.update_prompt(prompt_id, &patch)?;
            Ok(())
        })?;

        info!(
            prompt_id = %prompt_id,
            source_version = target.version_number,
            new_version = new_version.version_number,
            "Rolled back prompt"
        );
        Ok(Rollback {
            prompt: patch.apply(prompt),
            new_version,
        })
    }

    /// Compare two versions using the service's default diff options.
    pub fn compare_versions(
        &self,
        version_id1: &str,
        version_id2: &str,
    ) -> VaultResult<VersionComparison> {
        self.compare_versions_with(version_id1, version_id2, &self.diff_options)
    }

    /// Compare two versions with explicit diff options.
    ///
    /// The versions may belong to different prompts; comparison is purely
    /// content-based.
    pub fn compare_versions_with(
        &self,
        version_id1: &str,
        version_id2: &str,
        options: &DiffOptions,
    ) -> VaultResult<VersionComparison> {
        let version1 = self.get_version(version_id1)?;
        let version2 = self.get_version(version_id2)?;
        let diff = generate_diff(&version1.content, &version2.content, options);
        Ok(VersionComparison {
            version1,
            version2,
            diff,
        })
    }

    /// Summary statistics over a prompt's version chain.
    pub fn version_stats(&self, prompt_id: &str) -> VaultResult<VersionStats> {
        self.require_prompt(prompt_id)?;
        let versions = self.storage.versions_for_prompt(prompt_id)?;

        Ok(VersionStats {
            total_versions: versions.len() as u32,
            rollback_count: versions.iter().filter(|v| v.is_rollback).count() as u32,
            first_version_date: versions.first().map(|v| v.created_at),
            last_version_date: versions.last().map(|v| v.created_at),
        })
    }

    /// Only the rollback entries of the history, newest first.
    pub fn rollback_versions(&self, prompt_id: &str) -> VaultResult<Vec<PromptVersion>> {
        let mut versions = self.version_history(prompt_id)?;
        versions.retain(|v| v.is_rollback);
        Ok(versions)
    }

    /// Versions whose number falls in `[start, end]`, newest first.
    pub fn versions_in_range(
        &self,
        prompt_id: &str,
        start: u32,
        end: u32,
    ) -> VaultResult<Vec<PromptVersion>> {
        if start < 1 || end < start {
            return Err(VaultError::validation(format!(
                "Invalid version range {}..{}",
                start, end
            )));
        }
        let mut versions = self.version_history(prompt_id)?;
        versions.retain(|v| v.version_number >= start && v.version_number <= end);
        Ok(versions)
    }

    fn require_prompt(&self, prompt_id: &str) -> VaultResult<Prompt> {
        self.storage
            .find_prompt(prompt_id)?
            .ok_or_else(|| VaultError::prompt_not_found(prompt_id))
    }
}
