//! Prompt lifecycle operations.
//!
//! [`PromptStore`] owns prompt creation, updates, listing, and deletion.
//! Content-changing updates append a version snapshot and move the HEAD
//! pointer in the same transaction, so `prompt.content`, the current
//! version's content, and `version_count` can never drift apart.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{VaultError, VaultResult};
use crate::locks::IdLocks;
use crate::storage::{PromptPatch, Storage};
use crate::types::{Prompt, PromptUpdate, PromptVersion, StoreStats};

/// Prompt CRUD service over a [`Storage`] backend.
pub struct PromptStore<S: Storage> {
    storage: Arc<S>,
    locks: IdLocks,
}

impl<S: Storage> PromptStore<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_locks(storage, IdLocks::new())
    }

    /// Build with a shared lock registry so other services mutating the same
    /// prompts serialize against this one.
    pub fn with_locks(storage: Arc<S>, locks: IdLocks) -> Self {
        Self { storage, locks }
    }

    /// Create a prompt together with its initial version.
    ///
    /// `note` becomes the initial version's note; without one, the version is
    /// annotated "Initial version".
    pub fn create_prompt(
        &self,
        title: &str,
        content: &str,
        tags: Vec<String>,
        note: Option<String>,
    ) -> VaultResult<Prompt> {
        let title = title.trim();
        if title.is_empty() {
            return Err(VaultError::empty_field("title"));
        }
        if content.trim().is_empty() {
            return Err(VaultError::empty_field("content"));
        }

        let mut version = PromptVersion::initial("", content, note);
        let prompt = Prompt::new(title, content, tags, version.id.clone());
        version.prompt_id = prompt.id.clone();

        self.storage.transaction(&mut |tx| {
            tx.create_prompt(&prompt)?;
            tx.create_version(&version)?;
            Ok(())
        })?;

        info!(prompt_id = %prompt.id, "Created prompt");
        Ok(prompt)
    }

    /// Look up a prompt by id.
    pub fn get_prompt(&self, id: &str) -> VaultResult<Prompt> {
        self.storage
            .find_prompt(id)?
            .ok_or_else(|| VaultError::prompt_not_found(id))
    }

    /// Apply a partial update.
    ///
    /// New content that differs from the current content appends a version
    /// and moves HEAD; content equal to the current content is a no-op for
    /// the version chain. Title and tag updates never touch the chain.
    pub fn update_prompt(&self, id: &str, update: PromptUpdate) -> VaultResult<Prompt> {
        let lock = self.locks.get(id);
        let _guard = lock.lock().unwrap();

        let prompt = self.get_prompt(id)?;

        let mut patch = PromptPatch {
            updated_at: Some(chrono::Utc::now()),
            ..Default::default()
        };

        if let Some(title) = &update.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(VaultError::empty_field("title"));
            }
            patch.title = Some(title.to_string());
        }
        if let Some(tags) = update.tags {
            patch.tags = Some(tags);
        }

        // Content emptiness is only validated at creation; an update whose
        // content differs from the current content always appends, even when
        // the new content is empty.
        let new_version = match &update.content {
            Some(content) if *content != prompt.content => {
                let version =
                    PromptVersion::content_update(&prompt, content, update.note.clone());
                patch.content = Some(content.clone());
                patch.current_version_id = Some(version.id.clone());
                patch.version_count = Some(version.version_number);
                Some(version)
            }
            _ => None,
        };

        self.storage.transaction(&mut |tx| {
            if let Some(version) = &new_version {
                tx.create_version(version)?;
            }
            tx.update_prompt(id, &patch)?;
            Ok(())
        })?;

        if let Some(version) = &new_version {
            info!(
                prompt_id = %id,
                version_number = version.version_number,
                "Updated prompt content"
            );
        } else {
            debug!(prompt_id = %id, "Updated prompt metadata");
        }
        Ok(patch.apply(prompt))
    }

    /// List prompts, most recently updated first.
    pub fn list_prompts(&self, limit: usize, offset: usize) -> VaultResult<Vec<Prompt>> {
        self.storage.list_prompts(limit, offset)
    }

    /// Prompts carrying the given tag, most recently updated first.
    pub fn prompts_by_tag(&self, tag: &str) -> VaultResult<Vec<Prompt>> {
        self.storage.prompts_by_tag(tag)
    }

    /// Delete a prompt and all of its versions, returning how many versions
    /// were removed.
    pub fn delete_prompt(&self, id: &str) -> VaultResult<usize> {
        let lock = self.locks.get(id);
        let _guard = lock.lock().unwrap();

        // Fail with NotFound before opening a transaction
        self.get_prompt(id)?;

        let removed = self.storage.transaction(&mut |tx| {
            let removed = tx.delete_versions_for_prompt(id)?;
            tx.delete_prompt(id)?;
            Ok(removed)
        })?;

        info!(prompt_id = %id, versions_removed = removed, "Deleted prompt");
        Ok(removed)
    }

    /// Store-wide totals.
    pub fn stats(&self) -> VaultResult<StoreStats> {
        let total_prompts = self.storage.count_prompts()?;
        let total_versions = self.storage.count_versions()?;
        let average_versions_per_prompt = if total_prompts == 0 {
            0.0
        } else {
            total_versions as f64 / total_prompts as f64
        };
        Ok(StoreStats {
            total_prompts,
            total_versions,
            average_versions_per_prompt,
        })
    }
}
