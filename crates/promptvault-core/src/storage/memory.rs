//! In-memory storage backend.
//!
//! Implements the same collaborator contract as the SQLite store, including
//! all-or-nothing transactions via snapshot-and-restore. Intended for tests
//! and ephemeral usage; it is never a second source of truth next to a
//! durable store.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{VaultError, VaultResult};
use crate::storage::{PromptPatch, Storage, StorageTx};
use crate::types::{Prompt, PromptVersion};

#[derive(Debug, Clone, Default)]
struct MemInner {
    prompts: HashMap<String, Prompt>,
    versions: HashMap<String, PromptVersion>,
}

/// HashMap-backed storage with transactional semantics.
#[derive(Debug, Default)]
pub struct MemStorage {
    inner: Mutex<MemInner>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemStorage {
    fn find_prompt(&self, id: &str) -> VaultResult<Option<Prompt>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.prompts.get(id).cloned())
    }

    fn find_version(&self, id: &str) -> VaultResult<Option<PromptVersion>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.versions.get(id).cloned())
    }

    fn versions_for_prompt(&self, prompt_id: &str) -> VaultResult<Vec<PromptVersion>> {
        let inner = self.inner.lock().unwrap();
        let mut versions: Vec<PromptVersion> = inner
            .versions
            .values()
            .filter(|v| v.prompt_id == prompt_id)
            .cloned()
            .collect();
        versions.sort_by_key(|v| v.version_number);
        Ok(versions)
    }

    fn list_prompts(&self, limit: usize, offset: usize) -> VaultResult<Vec<Prompt>> {
        let inner = self.inner.lock().unwrap();
        let mut prompts: Vec<Prompt> = inner.prompts.values().cloned().collect();
        prompts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(prompts.into_iter().skip(offset).take(limit).collect())
    }

    fn prompts_by_tag(&self, tag: &str) -> VaultResult<Vec<Prompt>> {
        let inner = self.inner.lock().unwrap();
        let mut prompts: Vec<Prompt> = inner
            .prompts
            .values()
            .filter(|p| p.tags.iter().any(|t| t == tag))
            .cloned()
            .collect();
        prompts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(prompts)
    }

    fn count_prompts(&self) -> VaultResult<u64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.prompts.len() as u64)
    }

    fn count_versions(&self) -> VaultResult<u64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.versions.len() as u64)
    }

    fn transaction<T>(
        &self,
        f: &mut dyn FnMut(&mut dyn StorageTx) -> VaultResult<T>,
    ) -> VaultResult<T> {
        let mut inner = self.inner.lock().unwrap();
        let snapshot = inner.clone();

        let result = {
            let mut tx = MemTx { inner: &mut inner };
            f(&mut tx)
        };

        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                *inner = snapshot;
                Err(err)
            }
        }
    }
}

struct MemTx<'a> {
    inner: &'a mut MemInner,
}

impl StorageTx for MemTx<'_> {
    fn create_prompt(&mut self, prompt: &Prompt) -> VaultResult<()> {
        if self.inner.prompts.contains_key(&prompt.id) {
            return Err(VaultError::database(format!(
                "duplicate prompt id '{}'",
                prompt.id
            )));
        }
        self.inner.prompts.insert(prompt.id.clone(), prompt.clone());
        Ok(())
    }

    fn update_prompt(&mut self, id: &str, patch: &PromptPatch) -> VaultResult<()> {
        let existing = self
            .inner
            .prompts
            .get(id)
            .cloned()
            .ok_or_else(|| VaultError::prompt_not_found(id))?;
        self.inner.prompts.insert(id.to_string(), patch.apply(existing));
        Ok(())
    }

    fn delete_prompt(&mut self, id: &str) -> VaultResult<()> {
        self.inner
            .prompts
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| VaultError::prompt_not_found(id))
    }

    fn create_version(&mut self, version: &PromptVersion) -> VaultResult<()> {
        let duplicate = self.inner.versions.values().any(|v| {
            v.prompt_id == version.prompt_id && v.version_number == version.version_number
        });
        if duplicate || self.inner.versions.contains_key(&version.id) {
            return Err(VaultError::database(format!(
                "duplicate version {} for prompt '{}'",
                version.version_number, version.prompt_id
            )));
        }
        self.inner
            .versions
            .insert(version.id.clone(), version.clone());
        Ok(())
    }

    fn delete_versions_for_prompt(&mut self, prompt_id: &str) -> VaultResult<usize> {
        let before = self.inner.versions.len();
        self.inner.versions.retain(|_, v| v.prompt_id != prompt_id);
        Ok(before - self.inner.versions.len())
    }

    fn find_prompt(&mut self, id: &str) -> VaultResult<Option<Prompt>> {
        Ok(self.inner.prompts.get(id).cloned())
    }
}
