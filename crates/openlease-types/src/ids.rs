//! Composite identifiers for the market hierarchy.
//!
//! ```text
//! Deployment (address)
//!   └─ Group        {deployment}{group-seq}
//!        └─ Order   {deployment}{group-seq}{order-seq}
//!             └─ Fulfillment / Lease
//!                   {deployment}{group-seq}{order-seq}{provider}
//! ```
//!
//! The byte form concatenates the raw deployment address with fixed-width
//! big-endian sequence numbers in parent → child order (and the raw
//! provider address last). Byte order therefore equals hierarchy order,
//! so "all children of X" is the closed key range
//! `[id(X, 0, .., MIN), id(X, MAX, .., MAX)]`.
//!
//! The string form is `hex(deployment)/group/order/hex(provider)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    Address, OpenleaseError, Result,
    constants::{ADDRESS_LEN, SEQ_LEN},
};

// ---------------------------------------------------------------------------
// Byte codec
// ---------------------------------------------------------------------------

/// Fixed-width binary encoding used for store keys.
pub trait CompositeId: Sized {
    /// Encoded width in bytes.
    const LEN: usize;

    /// Append the raw ID bytes to `out`.
    fn write_bytes(&self, out: &mut Vec<u8>);

    /// Decode from exactly [`Self::LEN`] bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self>;

    #[must_use]
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::LEN);
        self.write_bytes(&mut out);
        out
    }
}

/// Cursor over a composite ID's bytes.
struct IdReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> IdReader<'a> {
    fn new<T: CompositeId>(bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() != T::LEN {
            return Err(OpenleaseError::InvalidKey {
                reason: format!("expected {} id bytes, got {}", T::LEN, bytes.len()),
            });
        }
        Ok(Self { bytes, pos: 0 })
    }

    fn address(&mut self) -> Result<Address> {
        let end = self.pos + ADDRESS_LEN;
        let addr = Address::from_slice(&self.bytes[self.pos..end])?;
        self.pos = end;
        Ok(addr)
    }

    fn seq(&mut self) -> u64 {
        let mut raw = [0u8; SEQ_LEN];
        raw.copy_from_slice(&self.bytes[self.pos..self.pos + SEQ_LEN]);
        self.pos += SEQ_LEN;
        u64::from_be_bytes(raw)
    }
}

impl CompositeId for Address {
    const LEN: usize = ADDRESS_LEN;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        IdReader::new::<Self>(bytes)?.address()
    }
}

fn parse_seq(part: &str, what: &str) -> Result<u64> {
    part.parse::<u64>().map_err(|e| OpenleaseError::InvalidKey {
        reason: format!("bad {what} sequence {part:?}: {e}"),
    })
}

fn split_parts<'a, const N: usize>(s: &'a str, what: &str) -> Result<[&'a str; N]> {
    let parts: Vec<&'a str> = s.split('/').collect();
    parts.try_into().map_err(|parts: Vec<&'a str>| OpenleaseError::InvalidKey {
        reason: format!("{what} id needs {N} segments, got {}", parts.len()),
    })
}

// ---------------------------------------------------------------------------
// GroupId
// ---------------------------------------------------------------------------

/// A deployment group: `(deployment, seq)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct GroupId {
    pub deployment: Address,
    pub seq: u64,
}

impl GroupId {
    #[must_use]
    pub fn new(deployment: Address, seq: u64) -> Self {
        Self { deployment, seq }
    }
}

impl CompositeId for GroupId {
    const LEN: usize = ADDRESS_LEN + SEQ_LEN;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.deployment.0);
        out.extend_from_slice(&self.seq.to_be_bytes());
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = IdReader::new::<Self>(bytes)?;
        Ok(Self {
            deployment: r.address()?,
            seq: r.seq(),
        })
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.deployment, self.seq)
    }
}

impl FromStr for GroupId {
    type Err = OpenleaseError;

    fn from_str(s: &str) -> Result<Self> {
        let [dep, seq] = split_parts::<2>(s, "group")?;
        Ok(Self {
            deployment: dep.parse()?,
            seq: parse_seq(seq, "group")?,
        })
    }
}

// ---------------------------------------------------------------------------
// OrderId
// ---------------------------------------------------------------------------

/// An order against a group: `(deployment, group, seq)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OrderId {
    pub deployment: Address,
    pub group: u64,
    pub seq: u64,
}

impl OrderId {
    #[must_use]
    pub fn new(group: GroupId, seq: u64) -> Self {
        Self {
            deployment: group.deployment,
            group: group.seq,
            seq,
        }
    }

    #[must_use]
    pub fn group_id(&self) -> GroupId {
        GroupId::new(self.deployment, self.group)
    }
}

impl CompositeId for OrderId {
    const LEN: usize = ADDRESS_LEN + 2 * SEQ_LEN;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.deployment.0);
        out.extend_from_slice(&self.group.to_be_bytes());
        out.extend_from_slice(&self.seq.to_be_bytes());
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = IdReader::new::<Self>(bytes)?;
        Ok(Self {
            deployment: r.address()?,
            group: r.seq(),
            seq: r.seq(),
        })
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.deployment, self.group, self.seq)
    }
}

impl FromStr for OrderId {
    type Err = OpenleaseError;

    fn from_str(s: &str) -> Result<Self> {
        let [dep, group, seq] = split_parts::<3>(s, "order")?;
        Ok(Self {
            deployment: dep.parse()?,
            group: parse_seq(group, "group")?,
            seq: parse_seq(seq, "order")?,
        })
    }
}

// ---------------------------------------------------------------------------
// FulfillmentId / LeaseId
// ---------------------------------------------------------------------------

/// A provider's bid on an order: `(deployment, group, order, provider)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct FulfillmentId {
    pub deployment: Address,
    pub group: u64,
    pub order: u64,
    pub provider: Address,
}

/// A lease shares the composite ID of the fulfillment that won it, so the
/// lease for a fulfillment is found without a secondary index.
pub type LeaseId = FulfillmentId;

impl FulfillmentId {
    #[must_use]
    pub fn new(order: OrderId, provider: Address) -> Self {
        Self {
            deployment: order.deployment,
            group: order.group,
            order: order.seq,
            provider,
        }
    }

    #[must_use]
    pub fn order_id(&self) -> OrderId {
        OrderId {
            deployment: self.deployment,
            group: self.group,
            seq: self.order,
        }
    }

    #[must_use]
    pub fn group_id(&self) -> GroupId {
        GroupId::new(self.deployment, self.group)
    }
}

impl CompositeId for FulfillmentId {
    const LEN: usize = 2 * ADDRESS_LEN + 2 * SEQ_LEN;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.deployment.0);
        out.extend_from_slice(&self.group.to_be_bytes());
        out.extend_from_slice(&self.order.to_be_bytes());
        out.extend_from_slice(&self.provider.0);
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = IdReader::new::<Self>(bytes)?;
        Ok(Self {
            deployment: r.address()?,
            group: r.seq(),
            order: r.seq(),
            provider: r.address()?,
        })
    }
}

impl fmt::Display for FulfillmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.deployment, self.group, self.order, self.provider
        )
    }
}

impl FromStr for FulfillmentId {
    type Err = OpenleaseError;

    fn from_str(s: &str) -> Result<Self> {
        let [dep, group, order, provider] = split_parts::<4>(s, "fulfillment")?;
        Ok(Self {
            deployment: dep.parse()?,
            group: parse_seq(group, "group")?,
            order: parse_seq(order, "order")?,
            provider: provider.parse()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
