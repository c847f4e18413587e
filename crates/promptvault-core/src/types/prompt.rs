//! Prompt entity and update payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored prompt with its current content and version bookkeeping.
///
/// `content` always mirrors the content of the version referenced by
/// `current_version_id`, and `version_count` equals the number of versions
/// owned by this prompt. Both are maintained atomically with every
/// content-changing mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    /// Unique prompt identifier.
    pub id: String,
    /// User-defined title.
    pub title: String,
    /// Current prompt text (mirror of the current version's content).
    pub content: String,
    /// Categorization tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Initial creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Reference to the most recently appended version (HEAD).
    pub current_version_id: String,
    /// Total number of versions owned by this prompt.
    pub version_count: u32,
}

impl Prompt {
    /// Create a new prompt pointing at its initial version.
    pub(crate) fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        tags: Vec<String>,
        current_version_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            content: content.into(),
            tags,
            created_at: now,
            updated_at: now,
            current_version_id: current_version_id.into(),
            version_count: 1,
        }
    }
}

/// Partial update payload for a prompt.
///
/// Only the fields set to `Some` are applied. Providing `content` that
/// differs from the prompt's current content appends a new version;
/// title/tag-only updates never touch the version chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    /// Note for the version appended when `content` changes.
    pub note: Option<String>,
}

impl PromptUpdate {
    /// Builder: set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder: set the content.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Builder: set the tags.
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Builder: set the version note.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Store-wide statistics across all prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_prompts: u64,
    pub total_versions: u64,
    pub average_versions_per_prompt: f64,
}
