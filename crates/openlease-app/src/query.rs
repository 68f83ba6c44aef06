//! Read-only queries against the last committed snapshot.
//!
//! ```text
//!   /accounts/<addr>        one account
//!   /deployments/           all deployments
//!   /deployments/<addr>     one deployment
//!   /providers/             all providers
//!   /providers/<addr>       one provider
//!   /orders/                all orders
//!   /orders/<order-id>      one order
//!   /leases/                all leases
//!   /leases/<lease-id>      one lease
//! ```
//!
//! Every answer carries the raw proven read it was built from, so a client
//! holding only the root hash can check it. A missing entity is answered
//! with an empty value and a proof that its key is absent.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use openlease_state::{Hash, KvRead, Keyed, ProvableRead, ProvenRead, Snapshot, State, keys};
use openlease_types::{Account, Deployment, Lease, OpenleaseError, Order, Provider, Result};

/// Answer to one query path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Version of the snapshot the answer was read from.
    pub height: u64,
    pub root: Hash,
    /// JSON: one entity, or an array for listings. Empty when a single
    /// entity is absent.
    pub value: Vec<u8>,
    pub proof: ProvenRead,
}

impl QueryResponse {
    /// Check the attached proof against the root this response claims.
    pub fn verify(&self) -> Result<()> {
        self.proof.verify(&self.root)
    }

    /// Whether the proven read found anything.
    #[must_use]
    pub fn is_found(&self) -> bool {
        !self.proof.entries.is_empty()
    }
}

pub(crate) fn run(snapshot: &Snapshot, path: &str, limit: usize) -> Result<QueryResponse> {
    let route = path
        .strip_prefix('/')
        .and_then(|rest| rest.split_once('/'))
        .ok_or_else(|| unknown(path))?;

    let (value, proof) = match route {
        ("accounts", id) if !id.is_empty() => single::<Account>(snapshot, id)?,
        ("deployments", "") => listing::<Deployment>(snapshot, limit)?,
        ("deployments", id) => single::<Deployment>(snapshot, id)?,
        ("providers", "") => listing::<Provider>(snapshot, limit)?,
        ("providers", id) => single::<Provider>(snapshot, id)?,
        ("orders", "") => listing::<Order>(snapshot, limit)?,
        ("orders", id) => single::<Order>(snapshot, id)?,
        ("leases", "") => listing::<Lease>(snapshot, limit)?,
        ("leases", id) => single::<Lease>(snapshot, id)?,
        _ => return Err(unknown(path)),
    };

    Ok(QueryResponse {
        height: snapshot.version(),
        root: snapshot.root_hash(),
        value,
        proof,
    })
}

fn unknown(path: &str) -> OpenleaseError {
    OpenleaseError::InvalidKey {
        reason: format!("unknown query path {path:?}"),
    }
}

fn single<T>(snapshot: &Snapshot, raw_id: &str) -> Result<(Vec<u8>, ProvenRead)>
where
    T: Keyed,
    T::Id: FromStr<Err = OpenleaseError>,
{
    let id: T::Id = raw_id.parse()?;
    let key = keys::key_for::<T>(&id);
    let (entries, proof) = snapshot.get_range_with_proof(&key, &key, 1)?;
    let value = entries
        .first()
        .map(|(_, value)| value.clone())
        .unwrap_or_default();
    Ok((
        value,
        ProvenRead {
            start: key.clone(),
            end: key,
            limit: 1,
            entries,
            proof,
        },
    ))
}

fn listing<T: Keyed>(snapshot: &Snapshot, limit: usize) -> Result<(Vec<u8>, ProvenRead)> {
    let mut state = State::new(snapshot);
    let range = state.adapter::<T>().all_with_proof(limit)?;
    let value = serde_json::to_vec(&range.items).map_err(|e| OpenleaseError::Encode {
        what: T::KIND,
        reason: e.to_string(),
    })?;
    Ok((value, range.read))
}
