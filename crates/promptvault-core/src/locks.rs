//! Per-prompt mutation serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Registry of per-id locks, created lazily on first use.
///
/// Every mutation of a prompt acquires that prompt's lock before opening a
/// storage transaction, so concurrent mutations of the same prompt are
/// applied one after another while mutations of different prompts proceed
/// in parallel. Clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct IdLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl IdLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock handle for `id`. Hold the guard for the duration of the mutation.
    pub fn get(&self, id: &str) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().unwrap();
        map.entry(id.to_string()).or_default().clone()
    }
}
