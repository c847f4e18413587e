//! SQLite-backed persistence for prompts and version snapshots.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{VaultError, VaultResult};
use crate::storage::{PromptPatch, Storage, StorageTx};
use crate::types::{Prompt, PromptVersion};

/// SQLite-backed storage.
///
/// All access goes through a single connection guarded by a mutex, so
/// transactions from concurrent callers serialize at the connection.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Create a new store at the given path.
    pub fn new(path: impl AsRef<Path>) -> VaultResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path.as_ref())?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        debug!(path = %path.as_ref().display(), "Opened prompt database");
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> VaultResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> VaultResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS prompts (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                tags TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                current_version_id TEXT NOT NULL,
                version_count INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS prompt_versions (
                id TEXT PRIMARY KEY,
                prompt_id TEXT NOT NULL,
                content TEXT NOT NULL,
                note TEXT,
                created_at TEXT NOT NULL,
                version_number INTEGER NOT NULL,
                is_rollback INTEGER NOT NULL DEFAULT 0,
                source_version_id TEXT,
                UNIQUE(prompt_id, version_number)
            );

            -- Index for history queries
            CREATE INDEX IF NOT EXISTS idx_versions_prompt_num
                ON prompt_versions(prompt_id, version_number DESC);

            -- Index for listing prompts by recency
            CREATE INDEX IF NOT EXISTS idx_prompts_updated
                ON prompts(updated_at DESC);
        "#,
        )?;
        Ok(())
    }

    fn parse_timestamp(value: &str) -> VaultResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| VaultError::database(format!("invalid timestamp '{}': {}", value, e)))
    }

    fn row_to_prompt(row: &rusqlite::Row<'_>) -> VaultResult<Prompt> {
        let tags: String = row.get(3)?;
        let created_at: String = row.get(4)?;
        let updated_at: String = row.get(5)?;

        Ok(Prompt {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            tags: serde_json::from_str(&tags)?,
            created_at: Self::parse_timestamp(&created_at)?,
            updated_at: Self::parse_timestamp(&updated_at)?,
            current_version_id: row.get(6)?,
            version_count: row.get(7)?,
        })
    }

    fn row_to_version(row: &rusqlite::Row<'_>) -> VaultResult<PromptVersion> {
        let created_at: String = row.get(4)?;

        Ok(PromptVersion {
            id: row.get(0)?,
            prompt_id: row.get(1)?,
            content: row.get(2)?,
            note: row.get(3)?,
            created_at: Self::parse_timestamp(&created_at)?,
            version_number: row.get(5)?,
            is_rollback: row.get::<_, i32>(6)? != 0,
            source_version_id: row.get(7)?,
        })
    }
}

const PROMPT_COLUMNS: &str =
    "id, title, content, tags, created_at, updated_at, current_version_id, version_count";
const VERSION_COLUMNS: &str =
    "id, prompt_id, content, note, created_at, version_number, is_rollback, source_version_id";

impl Storage for SqliteStorage {
    fn find_prompt(&self, id: &str) -> VaultResult<Option<Prompt>> {
        let conn = self.conn.lock().unwrap();
        find_prompt_impl(&conn, id)
    }

    fn find_version(&self, id: &str) -> VaultResult<Option<PromptVersion>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM prompt_versions WHERE id = ?1",
            VERSION_COLUMNS
        ))?;

        stmt.query_row(params![id], |row| Ok(SqliteStorage::row_to_version(row)))
            .optional()?
            .transpose()
    }

    fn versions_for_prompt(&self, prompt_id: &str) -> VaultResult<Vec<PromptVersion>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM prompt_versions WHERE prompt_id = ?1 ORDER BY version_number ASC",
            VERSION_COLUMNS
        ))?;

        let results =
            stmt.query_map(params![prompt_id], |row| Ok(SqliteStorage::row_to_version(row)))?;

        results
            .map(|r| r.map_err(|e| e.into()).and_then(|inner| inner))
            .collect()
    }

    fn list_prompts(&self, limit: usize, offset: usize) -> VaultResult<Vec<Prompt>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM prompts ORDER BY updated_at DESC, id ASC LIMIT ?1 OFFSET ?2",
            PROMPT_COLUMNS
        ))?;

        let results = stmt.query_map(params![limit as i64, offset as i64], |row| {
            Ok(SqliteStorage::row_to_prompt(row))
        })?;

        results
            .map(|r| r.map_err(|e| e.into()).and_then(|inner| inner))
            .collect()
    }

    fn prompts_by_tag(&self, tag: &str) -> VaultResult<Vec<Prompt>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM prompts ORDER BY updated_at DESC, id ASC",
            PROMPT_COLUMNS
        ))?;

        let results = stmt.query_map([], |row| Ok(SqliteStorage::row_to_prompt(row)))?;

        // Tags are a JSON column, so the match runs on the decoded values
        results
            .map(|r| r.map_err(|e| e.into()).and_then(|inner| inner))
            .filter(|r| match r {
                Ok(prompt) => prompt.tags.iter().any(|t| t == tag),
                Err(_) => true,
            })
            .collect()
    }

    fn count_prompts(&self) -> VaultResult<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM prompts", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_versions(&self) -> VaultResult<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM prompt_versions", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn transaction<T>(
        &self,
        f: &mut dyn FnMut(&mut dyn StorageTx) -> VaultResult<T>,
    ) -> VaultResult<T> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let result = {
            let mut sqlite_tx = SqliteTx { tx: &tx };
            f(&mut sqlite_tx)
        };

        match result {
            Ok(value) => {
                tx.commit()
                    .map_err(|e| VaultError::transaction(e.to_string()))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(error = %rollback_err, "Transaction rollback failed");
                }
                Err(err)
            }
        }
    }
}

/// Write handle over an open SQLite transaction.
struct SqliteTx<'a> {
    tx: &'a Transaction<'a>,
}

impl StorageTx for SqliteTx<'_> {
    fn create_prompt(&mut self, prompt: &Prompt) -> VaultResult<()> {
        self.tx.execute(
            r#"INSERT INTO prompts
               (id, title, content, tags, created_at, updated_at, current_version_id, version_count)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
            params![
                prompt.id,
                prompt.title,
                prompt.content,
                serde_json::to_string(&prompt.tags)?,
                prompt.created_at.to_rfc3339(),
                prompt.updated_at.to_rfc3339(),
                prompt.current_version_id,
                prompt.version_count,
            ],
        )?;
        Ok(())
    }

    fn update_prompt(&mut self, id: &str, patch: &PromptPatch) -> VaultResult<()> {
        let existing = self
            .find_prompt(id)?
            .ok_or_else(|| VaultError::prompt_not_found(id))?;
        let merged = patch.apply(existing);

        self.tx.execute(
            r#"UPDATE prompts
               SET title = ?2, content = ?3, tags = ?4, updated_at = ?5,
                   current_version_id = ?6, version_count = ?7
               WHERE id = ?1"#,
            params![
                id,
                merged.title,
                merged.content,
                serde_json::to_string(&merged.tags)?,
                merged.updated_at.to_rfc3339(),
                merged.current_version_id,
                merged.version_count,
            ],
        )?;
        Ok(())
    }

    fn delete_prompt(&mut self, id: &str) -> VaultResult<()> {
        let affected = self
            .tx
            .execute("DELETE FROM prompts WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(VaultError::prompt_not_found(id));
        }
        Ok(())
    }

    fn create_version(&mut self, version: &PromptVersion) -> VaultResult<()> {
        self.tx.execute(
            r#"INSERT INTO prompt_versions
               (id, prompt_id, content, note, created_at, version_number, is_rollback, source_version_id)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
            params![
                version.id,
                version.prompt_id,
                version.content,
                version.note,
                version.created_at.to_rfc3339(),
                version.version_number,
                version.is_rollback as i32,
                version.source_version_id,
            ],
        )?;
        Ok(())
    }

    fn delete_versions_for_prompt(&mut self, prompt_id: &str) -> VaultResult<usize> {
        let affected = self.tx.execute(
            "DELETE FROM prompt_versions WHERE prompt_id = ?1",
            params![prompt_id],
        )?;
        Ok(affected)
    }

    fn find_prompt(&mut self, id: &str) -> VaultResult<Option<Prompt>> {
        find_prompt_impl(self.tx, id)
    }
}

fn find_prompt_impl(conn: &Connection, id: &str) -> VaultResult<Option<Prompt>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM prompts WHERE id = ?1",
        PROMPT_COLUMNS
    ))?;

    stmt.query_row(params![id], |row| Ok(SqliteStorage::row_to_prompt(row)))
        .optional()?
        .transpose()
}
