//! Persistence collaborator contract.
//!
//! The core depends only on this narrow interface: record-level
//! create/find/update/delete plus all-or-nothing transactions. Two
//! implementations are provided, [`SqliteStorage`] and the test-oriented
//! [`MemStorage`]; anything else satisfying these traits plugs in unchanged.

pub mod memory;
pub mod sqlite;

pub use memory::MemStorage;
pub use sqlite::SqliteStorage;

use chrono::{DateTime, Utc};

use crate::error::VaultResult;
use crate::types::{Prompt, PromptVersion};

/// Partial column-level update for a prompt record.
///
/// Only the fields set to `Some` are written; the rest keep their stored
/// values. Mirrors the update shape of the prompt table so a single
/// mutation can adjust content, HEAD pointer, and version count together.
#[derive(Debug, Clone, Default)]
pub struct PromptPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub current_version_id: Option<String>,
    pub version_count: Option<u32>,
}

impl PromptPatch {
    /// Merge this patch into an existing record.
    pub fn apply(&self, mut prompt: Prompt) -> Prompt {
        if let Some(title) = &self.title {
            prompt.title = title.clone();
        }
        if let Some(content) = &self.content {
            prompt.content = content.clone();
        }
        if let Some(tags) = &self.tags {
            prompt.tags = tags.clone();
        }
        if let Some(updated_at) = self.updated_at {
            prompt.updated_at = updated_at;
        }
        if let Some(current_version_id) = &self.current_version_id {
            prompt.current_version_id = current_version_id.clone();
        }
        if let Some(version_count) = self.version_count {
            prompt.version_count = version_count;
        }
        prompt
    }
}

/// Write operations available inside a transaction.
///
/// Object-safe so transaction closures can be passed as `&mut dyn StorageTx`
/// regardless of the backing store.
pub trait StorageTx {
    /// Insert a new prompt record.
    fn create_prompt(&mut self, prompt: &Prompt) -> VaultResult<()>;

    /// Apply a partial update to an existing prompt.
    fn update_prompt(&mut self, id: &str, patch: &PromptPatch) -> VaultResult<()>;

    /// Delete a prompt record.
    fn delete_prompt(&mut self, id: &str) -> VaultResult<()>;

    /// Insert a new version record.
    fn create_version(&mut self, version: &PromptVersion) -> VaultResult<()>;

    /// Delete all versions owned by a prompt, returning how many were removed.
    fn delete_versions_for_prompt(&mut self, prompt_id: &str) -> VaultResult<usize>;

    /// Read a prompt, observing writes already made in this transaction.
    fn find_prompt(&mut self, id: &str) -> VaultResult<Option<Prompt>>;
}

/// Storage backend for prompts and versions.
pub trait Storage: Send + Sync {
    /// Look up a prompt by id.
    fn find_prompt(&self, id: &str) -> VaultResult<Option<Prompt>>;

    /// Look up a version by id.
    fn find_version(&self, id: &str) -> VaultResult<Option<PromptVersion>>;

    /// All versions owned by a prompt, ordered by ascending version number.
    fn versions_for_prompt(&self, prompt_id: &str) -> VaultResult<Vec<PromptVersion>>;

    /// Page through prompts, most recently updated first.
    fn list_prompts(&self, limit: usize, offset: usize) -> VaultResult<Vec<Prompt>>;

    /// All prompts carrying `tag`, most recently updated first.
    fn prompts_by_tag(&self, tag: &str) -> VaultResult<Vec<Prompt>>;

    /// Total number of stored prompts.
    fn count_prompts(&self) -> VaultResult<u64>;

    /// Total number of stored versions.
    fn count_versions(&self) -> VaultResult<u64>;

    /// Run `f` inside a transaction with all-or-nothing semantics.
    ///
    /// If `f` returns an error, every write it performed is rolled back and
    /// the error is propagated; no partial state is ever observable.
    fn transaction<T>(
        &self,
        f: &mut dyn FnMut(&mut dyn StorageTx) -> VaultResult<T>,
    ) -> VaultResult<T>
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_apply_partial() {
        let prompt = Prompt::new("Old", "content", vec!["t".to_string()], "v-1");
        let created_at = prompt.created_at;

        let patch = PromptPatch {
            title: Some("New".to_string()),
            version_count: Some(2),
            ..Default::default()
        };
        let merged = patch.apply(prompt);

        assert_eq!(merged.title, "New");
        assert_eq!(merged.version_count, 2);
        assert_eq!(merged.content, "content");
        assert_eq!(merged.tags, vec!["t".to_string()]);
        assert_eq!(merged.created_at, created_at);
    }

    #[test]
    fn test_patch_apply_empty_is_identity() {
        let prompt = Prompt::new("T", "c", vec![], "v-1");
        let merged = PromptPatch::default().apply(prompt.clone());
        assert_eq!(merged, prompt);
    }
}
