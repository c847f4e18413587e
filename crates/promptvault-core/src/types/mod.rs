//! Core data types for prompts and their version chains.

mod prompt;
mod version;

pub use prompt::{Prompt, PromptUpdate, StoreStats};
pub use version::{PromptVersion, VersionStats};
