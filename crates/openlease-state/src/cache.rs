//! Write-through cache buffering one block's (or one transaction's) writes.
//!
//! ```text
//!   key ─▶ Clean(Some(v))   read from backing, memoized
//!        ─▶ Clean(None)     read from backing, known absent
//!        ─▶ Dirty(v)        staged write
//!        ─▶ Removed         staged delete
//!   (no entry = never seen)
//! ```
//!
//! [`Cache::write`] flushes staged entries into the backing store in
//! ascending key order, so every node replaying the same block issues the
//! same sequence of backing writes.

use std::cell::RefCell;
use std::collections::BTreeMap;

use openlease_types::Result;

use crate::{KvPair, KvRead, KvStore};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Clean(Option<Vec<u8>>),
    Dirty(Vec<u8>),
    Removed,
}

impl Entry {
    fn is_staged(&self) -> bool {
        !matches!(self, Self::Clean(_))
    }
}

/// Buffers writes over a backing [`KvRead`].
#[derive(Debug)]
pub struct Cache<B> {
    backing: B,
    entries: RefCell<BTreeMap<Vec<u8>, Entry>>,
}

impl<B: KvRead> Cache<B> {
    pub fn new(backing: B) -> Self {
        Self {
            backing,
            entries: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn backing(&self) -> &B {
        &self.backing
    }

    /// Direct access to the backing store. Memoized reads are only valid
    /// while the backing data is not changed through this handle; call
    /// [`discard`](Self::discard) or [`write`](Self::write) first.
    pub fn backing_mut(&mut self) -> &mut B {
        &mut self.backing
    }

    /// Number of staged writes and deletes.
    pub fn pending(&self) -> usize {
        self.entries.borrow().values().filter(|e| e.is_staged()).count()
    }

    /// Drop every staged change and memoized read.
    pub fn discard(&mut self) {
        self.entries.get_mut().clear();
    }

    /// Drop staged changes and hand back the backing store.
    pub fn into_inner(self) -> B {
        self.backing
    }
}

impl<B: KvStore> Cache<B> {
    /// Flush staged entries into the backing store in sorted key order.
    pub fn write(&mut self) -> Result<()> {
        let entries = std::mem::take(self.entries.get_mut());
        for (key, entry) in entries {
            match entry {
                Entry::Dirty(value) => self.backing.set(&key, value)?,
                Entry::Removed => {
                    self.backing.remove(&key)?;
                }
                Entry::Clean(_) => {}
            }
        }
        Ok(())
    }
}

impl<B: KvRead> KvRead for Cache<B> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if let Some(entry) = self.entries.borrow().get(key) {
            return Ok(match entry {
                Entry::Clean(value) => value.clone(),
                Entry::Dirty(value) => Some(value.clone()),
                Entry::Removed => None,
            });
        }
        let value = self.backing.get(key)?;
        self.entries
            .borrow_mut()
            .insert(key.to_vec(), Entry::Clean(value.clone()));
        Ok(value)
    }

    fn get_range(&self, start: &[u8], end: &[u8], limit: usize) -> Result<Vec<KvPair>> {
        if start > end || limit == 0 {
            return Ok(Vec::new());
        }
        let entries = self.entries.borrow();
        let staged: Vec<(&Vec<u8>, &Entry)> = entries
            .range(start.to_vec()..=end.to_vec())
            .filter(|(_, e)| e.is_staged())
            .collect();

        // Each staged delete can hide at most one backing entry, so asking
        // for `limit + staged` keeps the first `limit` merged keys exact.
        let fetched = self
            .backing
            .get_range(start, end, limit.saturating_add(staged.len()))?;
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = fetched.into_iter().collect();
        for (key, entry) in staged {
            match entry {
                Entry::Dirty(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                Entry::Removed => {
                    merged.remove(key);
                }
                Entry::Clean(_) => {}
            }
        }
        Ok(merged.into_iter().take(limit).collect())
    }

    fn version(&self) -> u64 {
        self.backing.version()
    }
}

impl<B: KvRead> KvStore for Cache<B> {
    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.entries
            .get_mut()
            .insert(key.to_vec(), Entry::Dirty(value));
        Ok(())
    }

    fn remove(&mut self, key: &[u8]) -> Result<bool> {
        let existed = self.get(key)?.is_some();
        self.entries.get_mut().insert(key.to_vec(), Entry::Removed);
        Ok(existed)
    }
}
