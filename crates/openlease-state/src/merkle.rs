//! Binary Merkle tree over the sorted key space, and range proofs.
//!
//! ```text
//!   leaf  = H(0x00 || len(key) u64 BE || key || H(value))
//!   node  = H(0x01 || left || right)
//!   empty = H("openlease:merkle:empty:v1")
//! ```
//!
//! Leaves are the store's entries in ascending key order. When a level has
//! an odd number of nodes the last one is carried up unchanged, so an audit
//! path only needs the leaf index and the leaf count to know which side each
//! sibling sits on.
//!
//! A [`RangeProof`] proves both membership and completeness: the returned
//! leaves are contiguous, the leaf just left of the range sorts below
//! `start`, and the leaf just right of it sorts above `end` (unless the
//! result was cut short by `limit`).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use openlease_types::{OpenleaseError, Result};

use crate::KvPair;

/// A SHA-256 digest.
pub type Hash = [u8; 32];

const LEAF_DOMAIN: u8 = 0x00;
const NODE_DOMAIN: u8 = 0x01;
const EMPTY_DOMAIN: &[u8] = b"openlease:merkle:empty:v1";

#[must_use]
pub fn value_hash(value: &[u8]) -> Hash {
    Sha256::digest(value).into()
}

fn leaf_hash(key: &[u8], value_hash: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_DOMAIN]);
    hasher.update((key.len() as u64).to_be_bytes());
    hasher.update(key);
    hasher.update(value_hash);
    hasher.finalize().into()
}

fn node_hash(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([NODE_DOMAIN]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Root of a tree with no leaves.
#[must_use]
pub fn empty_root() -> Hash {
    Sha256::digest(EMPTY_DOMAIN).into()
}

// ---------------------------------------------------------------------------
// MerkleTree
// ---------------------------------------------------------------------------

/// Immutable tree over a sorted entry list.
#[derive(Debug, Default)]
pub struct MerkleTree {
    entries: Vec<KvPair>,
    /// `levels[0]` are the leaf hashes; the last level holds the root.
    levels: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Build from entries that are already sorted by key with no duplicates.
    #[must_use]
    pub fn build(entries: Vec<KvPair>) -> Self {
        let mut levels = Vec::new();
        if !entries.is_empty() {
            let leaves: Vec<Hash> = entries
                .iter()
                .map(|(k, v)| leaf_hash(k, &value_hash(v)))
                .collect();
            levels.push(leaves);
            while let Some(level) = levels.last().filter(|l| l.len() > 1) {
                let next = level
                    .chunks(2)
                    .map(|pair| pair.get(1).map_or(pair[0], |r| node_hash(&pair[0], r)))
                    .collect();
                levels.push(next);
            }
        }
        Self { entries, levels }
    }

    #[must_use]
    pub fn root(&self) -> Hash {
        self.levels
            .last()
            .and_then(|top| top.first())
            .copied()
            .unwrap_or_else(empty_root)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.entries
            .binary_search_by(|(k, _)| k.as_slice().cmp(key))
            .ok()
            .map(|i| self.entries[i].1.as_slice())
    }

    /// Index window `[lo, hi)` of the entries a range read returns.
    fn window(&self, start: &[u8], end: &[u8], limit: usize) -> (usize, usize) {
        let lo = self.entries.partition_point(|(k, _)| k.as_slice() < start);
        let hi = self.entries.partition_point(|(k, _)| k.as_slice() <= end);
        let hi = hi.max(lo);
        (lo, lo + (hi - lo).min(limit))
    }

    #[must_use]
    pub fn range(&self, start: &[u8], end: &[u8], limit: usize) -> &[KvPair] {
        let (lo, hi) = self.window(start, end, limit);
        &self.entries[lo..hi]
    }

    #[must_use]
    pub fn prove_range(&self, start: &[u8], end: &[u8], limit: usize) -> (Vec<KvPair>, RangeProof) {
        let (lo, hi) = self.window(start, end, limit);
        let proof = RangeProof {
            root: self.root(),
            leaf_count: self.len(),
            left: lo.checked_sub(1).map(|i| self.leaf_proof(i)),
            leaves: (lo..hi).map(|i| self.leaf_proof(i)).collect(),
            right: (hi < self.len()).then(|| self.leaf_proof(hi)),
        };
        (self.entries[lo..hi].to_vec(), proof)
    }

    fn leaf_proof(&self, index: usize) -> LeafProof {
        let mut siblings = Vec::new();
        let mut i = index;
        for level in &self.levels[..self.levels.len().saturating_sub(1)] {
            if let Some(h) = level.get(i ^ 1) {
                siblings.push(*h);
            }
            i /= 2;
        }
        let (key, value) = &self.entries[index];
        LeafProof {
            index,
            key: key.clone(),
            value_hash: value_hash(value),
            siblings,
        }
    }
}

// ---------------------------------------------------------------------------
// Proofs
// ---------------------------------------------------------------------------

/// Audit path for one leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafProof {
    pub index: usize,
    pub key: Vec<u8>,
    pub value_hash: Hash,
    /// Sibling hashes bottom-up; carried levels contribute none.
    pub siblings: Vec<Hash>,
}

impl LeafProof {
    /// Fold the audit path up to a root, given the tree's leaf count.
    fn compute_root(&self, leaf_count: usize) -> Option<Hash> {
        if self.index >= leaf_count {
            return None;
        }
        let mut hash = leaf_hash(&self.key, &self.value_hash);
        let mut index = self.index;
        let mut width = leaf_count;
        let mut siblings = self.siblings.iter();
        while width > 1 {
            if index % 2 == 1 {
                hash = node_hash(siblings.next()?, &hash);
            } else if index + 1 < width {
                hash = node_hash(&hash, siblings.next()?);
            }
            index /= 2;
            width = width.div_ceil(2);
        }
        siblings.next().is_none().then_some(hash)
    }
}

/// Proof that a range read returned exactly the stored entries in range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeProof {
    pub root: Hash,
    pub leaf_count: usize,
    /// Closest leaf below `start`, if any.
    pub left: Option<LeafProof>,
    pub leaves: Vec<LeafProof>,
    /// Closest leaf after the returned ones, if any.
    pub right: Option<LeafProof>,
}

fn invalid(reason: impl Into<String>) -> OpenleaseError {
    OpenleaseError::InvalidProof(reason.into())
}

impl RangeProof {
    /// Check `entries` against `root` for the read `(start, end, limit)`.
    pub fn verify(
        &self,
        root: &Hash,
        start: &[u8],
        end: &[u8],
        limit: usize,
        entries: &[KvPair],
    ) -> Result<()> {
        if &self.root != root {
            return Err(invalid("root mismatch"));
        }
        if self.leaf_count == 0 && self.root != empty_root() {
            return Err(invalid("empty tree with non-empty root"));
        }
        if self.leaves.len() != entries.len() {
            return Err(invalid(format!(
                "{} leaves for {} entries",
                self.leaves.len(),
                entries.len()
            )));
        }

        let check_path = |leaf: &LeafProof| -> Result<()> {
            match leaf.compute_root(self.leaf_count) {
                Some(h) if h == self.root => Ok(()),
                _ => Err(invalid(format!("bad audit path for leaf {}", leaf.index))),
            }
        };

        let first = match &self.left {
            Some(left) => {
                check_path(left)?;
                if left.key.as_slice() >= start {
                    return Err(invalid("left neighbour is inside the range"));
                }
                left.index + 1
            }
            None => 0,
        };

        for (offset, (leaf, (key, value))) in self.leaves.iter().zip(entries).enumerate() {
            if leaf.index != first + offset {
                return Err(invalid(format!("leaf {} is not contiguous", leaf.index)));
            }
            if leaf.key != *key || leaf.value_hash != value_hash(value) {
                return Err(invalid(format!("leaf {} does not match entry", leaf.index)));
            }
            if key.as_slice() < start || key.as_slice() > end {
                return Err(invalid(format!("leaf {} is outside the range", leaf.index)));
            }
            check_path(leaf)?;
        }

        let after = first + self.leaves.len();
        match &self.right {
            Some(right) => {
                if right.index != after {
                    return Err(invalid("right neighbour is not adjacent"));
                }
                check_path(right)?;
                if right.key.as_slice() <= end && entries.len() < limit {
                    return Err(invalid("entry in range omitted"));
                }
            }
            None if after != self.leaf_count => {
                return Err(invalid("missing right neighbour"));
            }
            None => {}
        }
        Ok(())
    }
}
