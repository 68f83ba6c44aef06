//! Every entity key survives `key_for(parse_key(k)) == k`.

use openlease_state::keys::{Keyed, key_for, parse_key};
use openlease_types::{
    Account, Address, Deployment, Fulfillment, FulfillmentId, Group, GroupId, Lease, Order,
    OrderId, Provider,
};
use proptest::prelude::*;

fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 32]>().prop_map(Address::from_bytes)
}

fn group_id() -> impl Strategy<Value = GroupId> {
    (address(), any::<u64>()).prop_map(|(d, s)| GroupId::new(d, s))
}

fn order_id() -> impl Strategy<Value = OrderId> {
    (group_id(), any::<u64>()).prop_map(|(g, s)| OrderId::new(g, s))
}

fn fulfillment_id() -> impl Strategy<Value = FulfillmentId> {
    (order_id(), address()).prop_map(|(o, p)| FulfillmentId::new(o, p))
}

fn roundtrip<T: Keyed>(id: &T::Id) -> Vec<u8>
where
    T::Id: PartialEq + std::fmt::Debug,
{
    let key = key_for::<T>(id);
    let parsed = parse_key::<T>(&key).unwrap();
    assert_eq!(&parsed, id);
    key_for::<T>(&parsed)
}

proptest! {
    #[test]
    fn address_keys_roundtrip(addr in address()) {
        let k = key_for::<Account>(&addr);
        prop_assert_eq!(roundtrip::<Account>(&addr), k);
        let k = key_for::<Deployment>(&addr);
        prop_assert_eq!(roundtrip::<Deployment>(&addr), k);
        let k = key_for::<Provider>(&addr);
        prop_assert_eq!(roundtrip::<Provider>(&addr), k);
    }

    #[test]
    fn group_keys_roundtrip(id in group_id()) {
        let k = key_for::<Group>(&id);
        prop_assert_eq!(roundtrip::<Group>(&id), k);
    }

    #[test]
    fn order_keys_roundtrip(id in order_id()) {
        let k = key_for::<Order>(&id);
        prop_assert_eq!(roundtrip::<Order>(&id), k);
    }

    #[test]
    fn fulfillment_and_lease_keys_roundtrip(id in fulfillment_id()) {
        let k = key_for::<Fulfillment>(&id);
        prop_assert_eq!(roundtrip::<Fulfillment>(&id), k);
        let k = key_for::<Lease>(&id);
        prop_assert_eq!(roundtrip::<Lease>(&id), k);
    }

    #[test]
    fn key_order_matches_id_order(a in order_id(), b in order_id()) {
        prop_assert_eq!(a.cmp(&b), key_for::<Order>(&a).cmp(&key_for::<Order>(&b)));
    }
}
