//! Engine decisions, before they are applied or proposed.

use openlease_types::{
    Address, CloseReason, LeaseId, OrderId, TxCloseDeployment, TxCreateLease, TxCreateOrder,
    TxPayload,
};

/// One decision taken by a sub-engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketAction {
    CreateOrder { id: OrderId, end_at: u64 },
    CreateLease { id: LeaseId, price: u64 },
    CloseDeployment { deployment: Address, reason: CloseReason },
}

impl MarketAction {
    /// Whether the action proposes new economic activity (and so must go
    /// through the transaction pipeline when run outside the transition).
    #[must_use]
    pub fn is_proposal(&self) -> bool {
        matches!(self, Self::CreateOrder { .. } | Self::CreateLease { .. })
    }

    #[must_use]
    pub fn into_tx(self) -> TxPayload {
        match self {
            Self::CreateOrder { id, end_at } => TxPayload::CreateOrder(TxCreateOrder { id, end_at }),
            Self::CreateLease { id, price } => TxPayload::CreateLease(TxCreateLease { id, price }),
            Self::CloseDeployment { deployment, reason } => {
                TxPayload::CloseDeployment(TxCloseDeployment { deployment, reason })
            }
        }
    }
}
