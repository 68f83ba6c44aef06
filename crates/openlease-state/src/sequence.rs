//! Persistent per-parent counters.
//!
//! A sequence is a big-endian `u64` stored under its own key. It is not
//! synchronized: callers rely on the block pipeline serializing every
//! writer.

use openlease_types::{OpenleaseError, Result, constants::SEQ_LEN};

use crate::{KvRead, KvStore};

/// A counter stored in `D` under `key`.
pub struct Sequence<'a, D> {
    db: &'a mut D,
    key: Vec<u8>,
}

impl<'a, D> Sequence<'a, D> {
    pub(crate) fn new(db: &'a mut D, key: Vec<u8>) -> Self {
        Self { db, key }
    }
}

impl<D: KvRead> Sequence<'_, D> {
    /// Last value handed out; 0 when the counter was never advanced.
    pub fn current(&self) -> Result<u64> {
        let Some(raw) = self.db.get(&self.key)? else {
            return Ok(0);
        };
        let bytes: [u8; SEQ_LEN] = raw.as_slice().try_into().map_err(|_| OpenleaseError::Decode {
            what: "sequence",
            reason: format!("expected {SEQ_LEN} bytes, got {}", raw.len()),
        })?;
        Ok(u64::from_be_bytes(bytes))
    }

    /// Value the next [`advance`](Self::advance) will return.
    pub fn next(&self) -> Result<u64> {
        self.current()?
            .checked_add(1)
            .ok_or_else(|| OpenleaseError::Internal("sequence exhausted".into()))
    }
}

impl<D: KvStore> Sequence<'_, D> {
    /// Read, increment, persist, return.
    pub fn advance(&mut self) -> Result<u64> {
        let next = self.next()?;
        self.db.set(&self.key, next.to_be_bytes().to_vec())?;
        Ok(next)
    }
}
