use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use crate::errors::MoniError;

use super::{Result, StorageBackend};

/// In-process slots, for embedding hosts that own persistence themselves and
/// for tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a slot with raw text, bypassing the write path.
    pub fn with_slot(key: &str, data: &str) -> Self {
        let storage = Self::default();
        storage
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), data.to_string());
        storage
    }

    /// Makes every subsequent write fail, simulating a full or read-only disk.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots().get(key).cloned())
    }

    fn write(&self, key: &str, data: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(MoniError::Storage(format!("slot `{key}` is not writable")));
        }
        self.slots().insert(key.to_string(), data.to_string());
        Ok(())
    }
}
