//! Orders, fulfillments (bids) and leases.
//!
//! ```text
//!   Order:       OPEN ──match──▶ MATCHED
//!                  └──close──▶ CLOSED
//!   Fulfillment: OPEN ──win──▶ MATCHED ──close──▶ CLOSED
//!   Lease:       ACTIVE ──close──▶ CLOSED
//! ```

use serde::{Deserialize, Serialize};

use crate::{FulfillmentId, LeaseId, OrderId};

/// Lifecycle of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderState {
    Open,
    Matched,
    Closed,
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Matched => write!(f, "MATCHED"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// An open call for bids against a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub state: OrderState,
    /// Height at and after which the order is eligible for matching.
    pub end_at: u64,
}

impl Order {
    /// An order holds its group while it is OPEN or MATCHED.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, OrderState::Open | OrderState::Matched)
    }

    #[must_use]
    pub fn is_expired_at(&self, height: u64) -> bool {
        self.end_at <= height
    }
}

/// Lifecycle of a fulfillment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FulfillmentState {
    Open,
    Matched,
    Closed,
}

impl std::fmt::Display for FulfillmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Matched => write!(f, "MATCHED"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// A provider's priced bid against an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fulfillment {
    pub id: FulfillmentId,
    pub price: u64,
    pub state: FulfillmentState,
}

impl Fulfillment {
    /// The lease this fulfillment becomes if it wins.
    #[must_use]
    pub fn lease_id(&self) -> LeaseId {
        self.id
    }
}

/// Lifecycle of a lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeaseState {
    Active,
    Closed,
}

impl std::fmt::Display for LeaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// The binding match between an order and its winning fulfillment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub id: LeaseId,
    pub price: u64,
    pub state: LeaseState,
}

impl Lease {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == LeaseState::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Address, GroupId};

    fn order(state: OrderState, end_at: u64) -> Order {
        Order {
            id: OrderId::new(GroupId::new(Address::repeat(1), 1), 1),
            state,
            end_at,
        }
    }

    #[test]
    fn active_orders_hold_the_group() {
        assert!(order(OrderState::Open, 0).is_active());
        assert!(order(OrderState::Matched, 0).is_active());
        assert!(!order(OrderState::Closed, 0).is_active());
    }

    #[test]
    fn expiry_is_inclusive() {
        let o = order(OrderState::Open, 10);
        assert!(!o.is_expired_at(9));
        assert!(o.is_expired_at(10));
        assert!(o.is_expired_at(11));
    }

    #[test]
    fn lease_id_equals_fulfillment_id() {
        let f = Fulfillment {
            id: FulfillmentId::new(order(OrderState::Open, 1).id, Address::repeat(2)),
            price: 10,
            state: FulfillmentState::Open,
        };
        assert_eq!(f.lease_id(), f.id);
    }
}
