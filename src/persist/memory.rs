//! In-memory durable store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::error::{CacheError, Result};
use crate::persist::DurableStore;

/// Slots kept in a process-local map.
///
/// Survives dropping a `Cache` (the store is shared through an `Arc`), which
/// is enough to exercise reload paths without touching the filesystem.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `write` fail, as a full or unavailable store would.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of non-empty slots.
    pub fn len(&self) -> usize {
        self.lock_slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_slots().is_empty()
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave the map half-written
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DurableStore for MemoryStore {
    fn read(&self, slot: &str) -> Result<Option<String>> {
        Ok(self.lock_slots().get(slot).cloned())
    }

    fn write(&self, slot: &str, data: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Storage(std::io::Error::new(
                std::io::ErrorKind::Other,
                "storage quota exceeded",
            )));
        }
        self.lock_slots().insert(slot.to_string(), data.to_string());
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<()> {
        self.lock_slots().remove(slot);
        Ok(())
    }

    fn slots(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .lock_slots()
            .keys()
            .filter(|slot| slot.starts_with(prefix))
            .cloned()
            .collect())
    }
}
