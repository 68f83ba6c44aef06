//! Storage traits.
//!
//! ```text
//!   KvRead ──▶ KvStore        (Cache, MerkleStore)
//!     └────▶ ProvableRead     (Snapshot, MerkleStore)
//! ```
//!
//! Reads take `&self` so a read-only handle (a committed [`Snapshot`]) can
//! back the same adapters as the in-progress block cache. The blanket impls
//! for references let a per-transaction [`Cache`] borrow the block cache
//! instead of owning it.
//!
//! [`Snapshot`]: crate::Snapshot
//! [`Cache`]: crate::Cache

use openlease_types::Result;

use crate::RangeProof;

/// A key/value pair as stored.
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Read access to an ordered key/value store.
pub trait KvRead {
    /// Value under `key`, or `None` when the key is absent.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Entries with `start <= key <= end` in ascending key order, at most
    /// `limit` of them.
    fn get_range(&self, start: &[u8], end: &[u8], limit: usize) -> Result<Vec<KvPair>>;

    /// Last committed version (block height).
    fn version(&self) -> u64;
}

/// Mutable access. Writes are only visible through the same handle until
/// the owner commits or flushes them.
pub trait KvStore: KvRead {
    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<()>;

    /// Delete `key`, returning whether it existed.
    fn remove(&mut self, key: &[u8]) -> Result<bool>;
}

/// Range reads accompanied by a Merkle proof against the store's root.
pub trait ProvableRead: KvRead {
    fn get_range_with_proof(
        &self,
        start: &[u8],
        end: &[u8],
        limit: usize,
    ) -> Result<(Vec<KvPair>, RangeProof)>;
}

// ---------------------------------------------------------------------------
// Reference impls
// ---------------------------------------------------------------------------

impl<T: KvRead + ?Sized> KvRead for &T {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn get_range(&self, start: &[u8], end: &[u8], limit: usize) -> Result<Vec<KvPair>> {
        (**self).get_range(start, end, limit)
    }

    fn version(&self) -> u64 {
        (**self).version()
    }
}

impl<T: KvRead + ?Sized> KvRead for &mut T {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn get_range(&self, start: &[u8], end: &[u8], limit: usize) -> Result<Vec<KvPair>> {
        (**self).get_range(start, end, limit)
    }

    fn version(&self) -> u64 {
        (**self).version()
    }
}

impl<T: KvStore + ?Sized> KvStore for &mut T {
    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &[u8]) -> Result<bool> {
        (**self).remove(key)
    }
}

impl<T: ProvableRead + ?Sized> ProvableRead for &T {
    fn get_range_with_proof(
        &self,
        start: &[u8],
        end: &[u8],
        limit: usize,
    ) -> Result<(Vec<KvPair>, RangeProof)> {
        (**self).get_range_with_proof(start, end, limit)
    }
}

impl<T: ProvableRead + ?Sized> ProvableRead for &mut T {
    fn get_range_with_proof(
        &self,
        start: &[u8],
        end: &[u8],
        limit: usize,
    ) -> Result<(Vec<KvPair>, RangeProof)> {
        (**self).get_range_with_proof(start, end, limit)
    }
}
