//! Typed per-entity views over a key/value store.
//!
//! An [`Adapter`] borrows the store for the duration of one logical step
//! and encodes/decodes one entity kind. Reads need [`KvRead`], writes need
//! [`KvStore`], proven reads need [`ProvableRead`], so the same adapter type
//! serves the block cache and a committed [`Snapshot`](crate::Snapshot).

mod deployment;
mod market;

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use openlease_types::{
    Account, Deployment, Fulfillment, Group, Lease, OpenleaseError, Order, Provider, Result,
};

use crate::keys::{self, Keyed};
use crate::{Hash, KvPair, KvRead, KvStore, ProvableRead, RangeProof};

pub type AccountAdapter<'a, D> = Adapter<'a, Account, D>;
pub type DeploymentAdapter<'a, D> = Adapter<'a, Deployment, D>;
pub type GroupAdapter<'a, D> = Adapter<'a, Group, D>;
pub type ProviderAdapter<'a, D> = Adapter<'a, Provider, D>;
pub type OrderAdapter<'a, D> = Adapter<'a, Order, D>;
pub type FulfillmentAdapter<'a, D> = Adapter<'a, Fulfillment, D>;
pub type LeaseAdapter<'a, D> = Adapter<'a, Lease, D>;

/// Typed access to entities of kind `T` stored in `D`.
pub struct Adapter<'a, T, D> {
    db: &'a mut D,
    kind: PhantomData<fn() -> T>,
}

impl<'a, T: Keyed, D> Adapter<'a, T, D> {
    pub(crate) fn new(db: &'a mut D) -> Self {
        Self {
            db,
            kind: PhantomData,
        }
    }
}

impl<T: Keyed, D: KvRead> Adapter<'_, T, D> {
    pub fn get(&self, id: &T::Id) -> Result<Option<T>> {
        self.db
            .get(&keys::key_for::<T>(id))?
            .map(|raw| decode::<T>(&raw))
            .transpose()
    }

    /// Like [`get`](Self::get), but absence is a [`OpenleaseError::MissingEntity`].
    pub fn must_get(&self, id: &T::Id) -> Result<T> {
        self.get(id)?.ok_or_else(|| OpenleaseError::MissingEntity {
            kind: T::KIND,
            id: id.to_string(),
        })
    }

    /// Every stored entity of this kind, in key order.
    pub fn all(&self) -> Result<Vec<T>> {
        let (start, end) = keys::all_bounds::<T>();
        self.load(&start, &end)
    }

    pub(crate) fn between(&self, first: &T::Id, last: &T::Id) -> Result<Vec<T>> {
        let (start, end) = keys::id_bounds::<T>(first, last);
        self.load(&start, &end)
    }

    fn load(&self, start: &[u8], end: &[u8]) -> Result<Vec<T>> {
        self.db
            .get_range(start, end, usize::MAX)?
            .iter()
            .map(|(_, raw)| decode::<T>(raw))
            .collect()
    }
}

impl<T: Keyed, D: KvStore> Adapter<'_, T, D> {
    pub fn save(&mut self, obj: &T) -> Result<()> {
        let raw = serde_json::to_vec(obj).map_err(|e| OpenleaseError::Encode {
            what: T::KIND,
            reason: e.to_string(),
        })?;
        self.db.set(&keys::key_for::<T>(&obj.id()), raw)
    }
}

impl<T: Keyed, D: ProvableRead> Adapter<'_, T, D> {
    /// Up to `limit` entities of this kind, with a proof of the raw entries.
    pub fn all_with_proof(&self, limit: usize) -> Result<ProvenRange<T>> {
        let (start, end) = keys::all_bounds::<T>();
        let (entries, proof) = self.db.get_range_with_proof(&start, &end, limit)?;
        let items = entries
            .iter()
            .map(|(_, raw)| decode::<T>(raw))
            .collect::<Result<_>>()?;
        Ok(ProvenRange {
            items,
            read: ProvenRead {
                start,
                end,
                limit,
                entries,
                proof,
            },
        })
    }
}

fn decode<T: Keyed>(raw: &[u8]) -> Result<T> {
    serde_json::from_slice(raw).map_err(|e| OpenleaseError::Decode {
        what: T::KIND,
        reason: e.to_string(),
    })
}

/// A raw range read plus everything a client needs to check it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenRead {
    pub start: Vec<u8>,
    pub end: Vec<u8>,
    pub limit: usize,
    pub entries: Vec<KvPair>,
    pub proof: RangeProof,
}

impl ProvenRead {
    pub fn verify(&self, root: &Hash) -> Result<()> {
        self.proof
            .verify(root, &self.start, &self.end, self.limit, &self.entries)
    }
}

/// Decoded entities of one kind with the proven read they came from.
#[derive(Debug, Clone)]
pub struct ProvenRange<T> {
    pub items: Vec<T>,
    pub read: ProvenRead,
}
