//! Immutable version snapshots of prompt content.
//!
//! Every content-changing mutation appends a new version; versions are never
//! mutated afterwards and never deleted except as a cascade when the owning
//! prompt is deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Prompt;

/// A snapshot of prompt content at a point in its history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptVersion {
    /// Unique version identifier.
    pub id: String,
    /// Prompt this version belongs to.
    pub prompt_id: String,
    /// Content snapshot.
    pub content: String,
    /// Optional description of the change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// When this version was created.
    pub created_at: DateTime<Utc>,
    /// Sequential version number within the prompt (1, 2, 3...).
    pub version_number: u32,
    /// Whether this version was created by a rollback.
    pub is_rollback: bool,
    /// The version whose content was restored, set iff `is_rollback`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_version_id: Option<String>,
}

impl PromptVersion {
    /// Create version 1 for a freshly created prompt.
    pub fn initial(
        prompt_id: impl Into<String>,
        content: impl Into<String>,
        note: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            prompt_id: prompt_id.into(),
            content: content.into(),
            note: Some(note.unwrap_or_else(|| "Initial version".to_string())),
            created_at: Utc::now(),
            version_number: 1,
            is_rollback: false,
            source_version_id: None,
        }
    }

    /// Create the next version of `prompt` with updated content.
    pub fn content_update(
        prompt: &Prompt,
        content: impl Into<String>,
        note: Option<String>,
    ) -> Self {
        let version_number = prompt.version_count + 1;
        Self {
            id: Uuid::new_v4().to_string(),
            prompt_id: prompt.id.clone(),
            content: content.into(),
            note: Some(note.unwrap_or_else(|| format!("Version {}", version_number))),
            created_at: Utc::now(),
            version_number,
            is_rollback: false,
            source_version_id: None,
        }
    }

    /// Create the next version of `prompt` by restoring `target`'s content.
    ///
    /// The new version duplicates the target content; the target itself is
    /// left untouched.
    pub fn rollback_of(prompt: &Prompt, target: &PromptVersion, note: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            prompt_id: prompt.id.clone(),
            content: target.content.clone(),
            note: Some(
                note.unwrap_or_else(|| format!("Rollback to version {}", target.version_number)),
            ),
            created_at: Utc::now(),
            version_number: prompt.version_count + 1,
            is_rollback: true,
            source_version_id: Some(target.id.clone()),
        }
    }

    /// Builder: replace the note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Summary of the version chain of one prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionStats {
    pub total_versions: u32,
    pub rollback_count: u32,
    pub first_version_date: Option<DateTime<Utc>>,
    pub last_version_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt_with_count(count: u32) -> Prompt {
        let mut prompt = Prompt::new("T", "current", vec![], "v-head");
        prompt.version_count = count;
        prompt
    }

    #[test]
    fn test_initial_version() {
        let v = PromptVersion::initial("p-1", "hello", None);

        assert_eq!(v.prompt_id, "p-1");
        assert_eq!(v.content, "hello");
        assert_eq!(v.version_number, 1);
        assert!(!v.is_rollback);
        assert!(v.source_version_id.is_none());
        assert_eq!(v.note.as_deref(), Some("Initial version"));
    }

    #[test]
    fn test_content_update_version() {
        let prompt = prompt_with_count(3);
        let v = PromptVersion::content_update(&prompt, "next", None);

        assert_eq!(v.prompt_id, prompt.id);
        assert_eq!(v.version_number, 4);
        assert!(!v.is_rollback);
        assert_eq!(v.note.as_deref(), Some("Version 4"));
    }

    #[test]
    fn test_rollback_version() {
        let prompt = prompt_with_count(5);
        let target = PromptVersion::initial(&prompt.id, "old content", None);
        let v = PromptVersion::rollback_of(&prompt, &target, None);

        assert_eq!(v.content, "old content");
        assert_eq!(v.version_number, 6);
        assert!(v.is_rollback);
        assert_eq!(v.source_version_id.as_deref(), Some(target.id.as_str()));
        assert_eq!(v.note.as_deref(), Some("Rollback to version 1"));
    }

    #[test]
    fn test_custom_note() {
        let v = PromptVersion::initial("p-1", "hello", Some("imported".to_string()));
        assert_eq!(v.note.as_deref(), Some("imported"));

        let v = v.with_note("edited");
        assert_eq!(v.note.as_deref(), Some("edited"));
    }
}
