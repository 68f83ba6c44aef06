//! Domain events emitted by the matching engine and the transaction pipeline.
//!
//! External monitors key on [`MarketEvent::kind`] and the stable composite-ID
//! string from [`MarketEvent::id_string`].

use serde::{Deserialize, Serialize};

use crate::{LeaseId, OrderId};

/// Why a lease (and its deployment) was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CloseReason {
    /// The tenant closed the deployment.
    Tenant,
    /// The tenant's balance reached zero.
    InsufficientFunds,
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tenant => write!(f, "TENANT"),
            Self::InsufficientFunds => write!(f, "INSUFFICIENT_FUNDS"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MarketEvent {
    OrderCreate { id: OrderId, end_at: u64 },
    LeaseCreate { id: LeaseId, price: u64 },
    LeaseClose { id: LeaseId, reason: CloseReason },
}

impl MarketEvent {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OrderCreate { .. } => "order-create",
            Self::LeaseCreate { .. } => "lease-create",
            Self::LeaseClose { .. } => "lease-close",
        }
    }

    #[must_use]
    pub fn id_string(&self) -> String {
        match self {
            Self::OrderCreate { id, .. } => id.to_string(),
            Self::LeaseCreate { id, .. } | Self::LeaseClose { id, .. } => id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Address, FulfillmentId, GroupId};

    #[test]
    fn kinds_and_ids() {
        let order = OrderId::new(GroupId::new(Address::repeat(1), 2), 3);
        let ev = MarketEvent::OrderCreate { id: order, end_at: 9 };
        assert_eq!(ev.kind(), "order-create");
        assert_eq!(ev.id_string(), order.to_string());

        let lease = FulfillmentId::new(order, Address::repeat(4));
        let ev = MarketEvent::LeaseClose {
            id: lease,
            reason: CloseReason::InsufficientFunds,
        };
        assert_eq!(ev.kind(), "lease-close");
        assert!(ev.id_string().ends_with(&Address::repeat(4).to_string()));
    }

    #[test]
    fn serde_tag_matches_kind() {
        let ev = MarketEvent::LeaseCreate {
            id: FulfillmentId::new(
                OrderId::new(GroupId::new(Address::repeat(1), 1), 1),
                Address::repeat(2),
            ),
            price: 10,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["kind"], "lease-create");
        let back: MarketEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, ev);
    }
}
