//! Store key codec.
//!
//! Every entity lives under `PREFIX || id.to_bytes()`. Because composite IDs
//! are fixed-width and parent-first, the children of any parent form one
//! contiguous key range:
//!
//! ```text
//!   children(P) = [ key_for(P, 0, .., MIN) , key_for(P, MAX, .., MAX) ]
//! ```

use serde::{Serialize, de::DeserializeOwned};

use openlease_types::{
    Account, Address, CompositeId, Deployment, Fulfillment, FulfillmentId, Group, GroupId, Lease,
    OpenleaseError, Order, OrderId, Provider, Result, constants,
};

/// An entity stored under a composite ID.
pub trait Keyed: Serialize + DeserializeOwned {
    type Id: CompositeId + Copy + std::fmt::Display;

    /// Key prefix for this entity kind.
    const PREFIX: &'static [u8];

    /// Kind name used in errors and logs.
    const KIND: &'static str;

    fn id(&self) -> Self::Id;
}

/// `PREFIX || id`.
pub fn key_for<T: Keyed>(id: &T::Id) -> Vec<u8> {
    let mut key = Vec::with_capacity(T::PREFIX.len() + <T::Id as CompositeId>::LEN);
    key.extend_from_slice(T::PREFIX);
    id.write_bytes(&mut key);
    key
}

/// Inverse of [`key_for`]; rejects foreign prefixes and wrong widths.
pub fn parse_key<T: Keyed>(key: &[u8]) -> Result<T::Id> {
    let raw = key
        .strip_prefix(T::PREFIX)
        .ok_or_else(|| OpenleaseError::InvalidKey {
            reason: format!("key is not a {} key", T::KIND),
        })?;
    <T::Id as CompositeId>::from_bytes(raw)
}

/// Inclusive bounds covering every key of kind `T`.
pub fn all_bounds<T: Keyed>() -> (Vec<u8>, Vec<u8>) {
    let start = T::PREFIX.to_vec();
    let mut end = start.clone();
    end.resize(T::PREFIX.len() + <T::Id as CompositeId>::LEN, 0xff);
    (start, end)
}

/// Inclusive bounds between two IDs of kind `T`.
pub fn id_bounds<T: Keyed>(first: &T::Id, last: &T::Id) -> (Vec<u8>, Vec<u8>) {
    (key_for::<T>(first), key_for::<T>(last))
}

// ---------------------------------------------------------------------------
// Child bounds
// ---------------------------------------------------------------------------

pub(crate) fn groups_of(deployment: Address) -> (GroupId, GroupId) {
    (
        GroupId::new(deployment, 0),
        GroupId::new(deployment, u64::MAX),
    )
}

pub(crate) fn orders_of_group(group: GroupId) -> (OrderId, OrderId) {
    (OrderId::new(group, 0), OrderId::new(group, u64::MAX))
}

pub(crate) fn orders_of_deployment(deployment: Address) -> (OrderId, OrderId) {
    let (first, last) = groups_of(deployment);
    (OrderId::new(first, 0), OrderId::new(last, u64::MAX))
}

pub(crate) fn bids_of_order(order: OrderId) -> (FulfillmentId, FulfillmentId) {
    (
        FulfillmentId::new(order, Address::MIN),
        FulfillmentId::new(order, Address::MAX),
    )
}

pub(crate) fn bids_of_group(group: GroupId) -> (FulfillmentId, FulfillmentId) {
    let (first, last) = orders_of_group(group);
    (
        FulfillmentId::new(first, Address::MIN),
        FulfillmentId::new(last, Address::MAX),
    )
}

pub(crate) fn bids_of_deployment(deployment: Address) -> (FulfillmentId, FulfillmentId) {
    let (first, last) = orders_of_deployment(deployment);
    (
        FulfillmentId::new(first, Address::MIN),
        FulfillmentId::new(last, Address::MAX),
    )
}

// ---------------------------------------------------------------------------
// Entity bindings
// ---------------------------------------------------------------------------

impl Keyed for Account {
    type Id = Address;
    const PREFIX: &'static [u8] = constants::ACCOUNT_PREFIX;
    const KIND: &'static str = "account";

    fn id(&self) -> Address {
        self.address
    }
}

impl Keyed for Deployment {
    type Id = Address;
    const PREFIX: &'static [u8] = constants::DEPLOYMENT_PREFIX;
    const KIND: &'static str = "deployment";

    fn id(&self) -> Address {
        self.address
    }
}

impl Keyed for Group {
    type Id = GroupId;
    const PREFIX: &'static [u8] = constants::GROUP_PREFIX;
    const KIND: &'static str = "group";

    fn id(&self) -> GroupId {
        self.id
    }
}

impl Keyed for Provider {
    type Id = Address;
    const PREFIX: &'static [u8] = constants::PROVIDER_PREFIX;
    const KIND: &'static str = "provider";

    fn id(&self) -> Address {
        self.address
    }
}

impl Keyed for Order {
    type Id = OrderId;
    const PREFIX: &'static [u8] = constants::ORDER_PREFIX;
    const KIND: &'static str = "order";

    fn id(&self) -> OrderId {
        self.id
    }
}

impl Keyed for Fulfillment {
    type Id = FulfillmentId;
    const PREFIX: &'static [u8] = constants::FULFILLMENT_PREFIX;
    const KIND: &'static str = "fulfillment";

    fn id(&self) -> FulfillmentId {
        self.id
    }
}

impl Keyed for Lease {
    type Id = FulfillmentId;
    const PREFIX: &'static [u8] = constants::LEASE_PREFIX;
    const KIND: &'static str = "lease";

    fn id(&self) -> FulfillmentId {
        self.id
    }
}
