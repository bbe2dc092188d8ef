//! In-memory storage adapter
//!
//! Reference implementation of [`StoragePort`] used by tests and by hosts
//! that have no persistent storage available.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::ports::StoragePort;

/// Key/value store held in process memory
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoragePort for InMemoryStorage {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("storage mutex poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("storage mutex poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("storage mutex poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}
