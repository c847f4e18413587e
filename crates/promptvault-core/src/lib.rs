//! promptvault-core: version-controlled storage for prompt text.
//!
//! Prompts carry their full edit history as an append-only chain of version
//! snapshots. Every content change appends a version and moves the HEAD
//! pointer atomically; rollback restores old content by appending, never by
//! rewriting history. An LCS-based diff engine compares any two versions at
//! line, word, and character granularity.
//!
//! ```ignore
//! use promptvault_core::{PromptUpdate, Vault};
//!
//! let vault = Vault::open_in_memory()?;
//! let prompt = vault.store().create_prompt("Greeting", "Hello, world", vec![], None)?;
//!
//! vault
//!     .store()
//!     .update_prompt(&prompt.id, PromptUpdate::default().content("Hello, Rust"))?;
//!
//! let history = vault.control().version_history(&prompt.id)?;
//! let rollback = vault
//!     .control()
//!     .rollback_to_version(&prompt.id, &history[1].id, None)?;
//! assert_eq!(rollback.prompt.content, "Hello, world");
//! ```

pub mod config;
pub mod control;
pub mod diff;
pub mod error;
pub mod locks;
pub mod storage;
pub mod store;
pub mod types;
pub mod vault;

pub use config::VaultConfig;
pub use control::{Rollback, VersionComparison, VersionControl};
pub use diff::{generate_diff, DiffOptions, DiffResult, DiffSummary};
pub use error::{ErrorCode, VaultError, VaultResult};
pub use storage::{MemStorage, SqliteStorage, Storage};
pub use store::PromptStore;
pub use types::{Prompt, PromptUpdate, PromptVersion, StoreStats, VersionStats};
pub use vault::Vault;
