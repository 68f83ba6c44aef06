//! Versioned, authenticated in-memory store.
//!
//! ```text
//!   set/remove ──▶ working (BTreeMap)
//!                     │ commit()
//!                     ▼
//!   history: [Snapshot v(n-k+1)] … [Snapshot v(n)]   (k = keep_recent)
//! ```
//!
//! Reads through [`KvRead`] see the working set; [`KvRead::version`] reports
//! the last committed version. Each commit freezes the working set into an
//! immutable [`Snapshot`] carrying its own Merkle tree, so committed state
//! can be read and proven while the next block is being built.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use tracing::debug;

use openlease_types::{OpenleaseError, Result, StoreConfig};

use crate::{Hash, KvPair, KvRead, KvStore, MerkleTree, ProvableRead, RangeProof};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// An immutable committed version. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Snapshot {
    version: u64,
    tree: Arc<MerkleTree>,
}

impl Snapshot {
    /// The empty state at version 0.
    #[must_use]
    pub fn genesis() -> Self {
        Self {
            version: 0,
            tree: Arc::new(MerkleTree::default()),
        }
    }

    #[must_use]
    pub fn root_hash(&self) -> Hash {
        self.tree.root()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

impl KvRead for Snapshot {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.tree.get(key).map(<[u8]>::to_vec))
    }

    fn get_range(&self, start: &[u8], end: &[u8], limit: usize) -> Result<Vec<KvPair>> {
        Ok(self.tree.range(start, end, limit).to_vec())
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl ProvableRead for Snapshot {
    fn get_range_with_proof(
        &self,
        start: &[u8],
        end: &[u8],
        limit: usize,
    ) -> Result<(Vec<KvPair>, RangeProof)> {
        Ok(self.tree.prove_range(start, end, limit))
    }
}

// ---------------------------------------------------------------------------
// MerkleStore
// ---------------------------------------------------------------------------

/// The node's authoritative store.
#[derive(Debug)]
pub struct MerkleStore {
    working: BTreeMap<Vec<u8>, Vec<u8>>,
    /// Oldest first; never empty.
    history: VecDeque<Snapshot>,
    keep_recent: usize,
}

impl MerkleStore {
    /// Create an empty store retaining `keep_recent` committed versions
    /// (at least one).
    #[must_use]
    pub fn new(keep_recent: usize) -> Self {
        let mut history = VecDeque::new();
        history.push_back(Snapshot::genesis());
        Self {
            working: BTreeMap::new(),
            history,
            keep_recent: keep_recent.max(1),
        }
    }

    #[must_use]
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(usize::try_from(config.keep_recent).unwrap_or(usize::MAX))
    }

    /// Freeze the working set as the next version.
    pub fn commit(&mut self) -> (Hash, u64) {
        let version = self.version() + 1;
        let entries: Vec<KvPair> = self
            .working
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let snapshot = Snapshot {
            version,
            tree: Arc::new(MerkleTree::build(entries)),
        };
        let root = snapshot.root_hash();
        self.history.push_back(snapshot);
        while self.history.len() > self.keep_recent {
            self.history.pop_front();
        }
        debug!(
            version,
            root = %hex::encode(&root[..4]),
            keys = self.working.len(),
            "store committed"
        );
        (root, version)
    }

    /// The latest committed version.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.history.back().cloned().unwrap_or_else(Snapshot::genesis)
    }

    /// A retained historical version.
    pub fn snapshot_at(&self, version: u64) -> Result<Snapshot> {
        self.history
            .iter()
            .find(|s| s.version == version)
            .cloned()
            .ok_or_else(|| OpenleaseError::MissingEntity {
                kind: "version",
                id: version.to_string(),
            })
    }

    /// Root hash of the latest committed version.
    #[must_use]
    pub fn root_hash(&self) -> Hash {
        self.snapshot().root_hash()
    }

    /// Oldest version still readable.
    #[must_use]
    pub fn earliest_version(&self) -> u64 {
        self.history.front().map_or(0, |s| s.version)
    }
}

impl Default for MerkleStore {
    fn default() -> Self {
        Self::from_config(&StoreConfig::default())
    }
}

impl KvRead for MerkleStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.working.get(key).cloned())
    }

    fn get_range(&self, start: &[u8], end: &[u8], limit: usize) -> Result<Vec<KvPair>> {
        if start > end {
            return Ok(Vec::new());
        }
        Ok(self
            .working
            .range(start.to_vec()..=end.to_vec())
            .take(limit)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn version(&self) -> u64 {
        self.history.back().map_or(0, |s| s.version)
    }
}

impl KvStore for MerkleStore {
    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.working.insert(key.to_vec(), value);
        Ok(())
    }

    fn remove(&mut self, key: &[u8]) -> Result<bool> {
        Ok(self.working.remove(key).is_some())
    }
}

/// Proofs over uncommitted state build a throwaway tree; committed reads
/// should go through a [`Snapshot`].
impl ProvableRead for MerkleStore {
    fn get_range_with_proof(
        &self,
        start: &[u8],
        end: &[u8],
        limit: usize,
    ) -> Result<(Vec<KvPair>, RangeProof)> {
        let entries = self
            .working
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(MerkleTree::build(entries).prove_range(start, end, limit))
    }
}
