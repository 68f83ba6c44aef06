use openlease_types::{Address, Fulfillment, GroupId, Lease, Order, OrderId, Result};

use super::Adapter;
use crate::KvRead;
use crate::keys;

impl<D: KvRead> Adapter<'_, Order, D> {
    pub fn for_group(&self, group: GroupId) -> Result<Vec<Order>> {
        let (first, last) = keys::orders_of_group(group);
        self.between(&first, &last)
    }

    pub fn for_deployment(&self, deployment: Address) -> Result<Vec<Order>> {
        let (first, last) = keys::orders_of_deployment(deployment);
        self.between(&first, &last)
    }
}

impl<D: KvRead> Adapter<'_, Fulfillment, D> {
    /// Bids on `order` in provider-address order.
    pub fn for_order(&self, order: OrderId) -> Result<Vec<Fulfillment>> {
        let (first, last) = keys::bids_of_order(order);
        self.between(&first, &last)
    }

    pub fn for_group(&self, group: GroupId) -> Result<Vec<Fulfillment>> {
        let (first, last) = keys::bids_of_group(group);
        self.between(&first, &last)
    }

    pub fn for_deployment(&self, deployment: Address) -> Result<Vec<Fulfillment>> {
        let (first, last) = keys::bids_of_deployment(deployment);
        self.between(&first, &last)
    }
}

impl<D: KvRead> Adapter<'_, Lease, D> {
    pub fn for_order(&self, order: OrderId) -> Result<Vec<Lease>> {
        let (first, last) = keys::bids_of_order(order);
        self.between(&first, &last)
    }

    pub fn for_group(&self, group: GroupId) -> Result<Vec<Lease>> {
        let (first, last) = keys::bids_of_group(group);
        self.between(&first, &last)
    }

    pub fn for_deployment(&self, deployment: Address) -> Result<Vec<Lease>> {
        let (first, last) = keys::bids_of_deployment(deployment);
        self.between(&first, &last)
    }

    /// ACTIVE leases across every deployment, in key order.
    pub fn active(&self) -> Result<Vec<Lease>> {
        Ok(self.all()?.into_iter().filter(Lease::is_active).collect())
    }
}
