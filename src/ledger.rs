// File: src/ledger.rs
use crate::core::key::CombinationKey;
use crate::error::PersistenceError;
use crate::persistence::{load_ledger, save_ledger};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Every combination key issued so far.
///
/// Single writer: nothing here guards against two processes sharing one
/// ledger file. The last snapshot written wins.
#[derive(Debug, Clone, Default)]
pub struct UniquenessLedger {
    keys: BTreeSet<CombinationKey>,
    path: Option<PathBuf>,
}

impl UniquenessLedger {
    /// A ledger that never touches disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, PersistenceError> {
        Ok(Self {
            keys: load_ledger(path)?,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn contains(&self, key: &CombinationKey) -> bool {
        self.keys.contains(key)
    }

    /// Idempotent. Returns true when the key was new.
    pub fn insert(&mut self, key: CombinationKey) -> bool {
        self.keys.insert(key)
    }

    pub fn remove(&mut self, key: &CombinationKey) -> bool {
        self.keys.remove(key)
    }

    pub fn reset(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CombinationKey> {
        self.keys.iter()
    }

    pub fn persist(&self) -> Result<(), PersistenceError> {
        match &self.path {
            Some(path) => save_ledger(&self.keys, path),
            None => Ok(()),
        }
    }

    /// Inserts `key` and persists. The insert is undone if the write fails,
    /// so memory never runs ahead of disk. Returns false for a known key.
    pub fn record(&mut self, key: CombinationKey) -> Result<bool, PersistenceError> {
        if self.keys.contains(&key) {
            return Ok(false);
        }
        self.keys.insert(key.clone());
        if let Err(e) = self.persist() {
            self.keys.remove(&key);
            return Err(e);
        }
        Ok(true)
    }

    /// Clears all history and persists the empty set. On a failed write the
    /// previous keys are restored.
    pub fn clear_and_persist(&mut self) -> Result<usize, PersistenceError> {
        let previous = std::mem::take(&mut self.keys);
        let cleared = previous.len();
        if let Err(e) = self.persist() {
            self.keys = previous;
            return Err(e);
        }
        Ok(cleared)
    }
}
