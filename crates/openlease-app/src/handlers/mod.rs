//! One handler per transaction kind.
//!
//! `check` only reads, so it runs against any [`KvRead`] (a `check_tx`
//! branch or the block cache). `apply` assumes `check` passed and performs
//! the writes through the shared [`mutations`](openlease_engine::mutations).

mod close_deployment;
mod create_lease;
mod create_order;

pub use close_deployment::CloseDeploymentHandler;
pub use create_lease::CreateLeaseHandler;
pub use create_order::CreateOrderHandler;

use openlease_state::{KvRead, KvStore, State};
use openlease_types::{MarketEvent, Result, TxPayload};

use crate::TxContext;

/// Validation and application of one transaction kind.
pub trait TxHandler {
    type Tx;

    /// Reject the transaction if any precondition on `state` fails.
    fn check<D: KvRead>(&self, ctx: &TxContext, state: &mut State<D>, tx: &Self::Tx)
    -> Result<()>;

    /// Perform the writes of an already checked transaction.
    fn apply<D: KvStore>(
        &self,
        ctx: &TxContext,
        state: &mut State<D>,
        tx: &Self::Tx,
    ) -> Result<Vec<MarketEvent>>;

    /// `check`, then `apply` against the same state.
    fn deliver<D: KvStore>(
        &self,
        ctx: &TxContext,
        state: &mut State<D>,
        tx: &Self::Tx,
    ) -> Result<Vec<MarketEvent>> {
        self.check(ctx, state, tx)?;
        self.apply(ctx, state, tx)
    }
}

/// Route a payload to its handler's `check`.
pub fn check<D: KvRead>(ctx: &TxContext, state: &mut State<D>, payload: &TxPayload) -> Result<()> {
    match payload {
        TxPayload::CreateOrder(tx) => CreateOrderHandler.check(ctx, state, tx),
        TxPayload::CreateLease(tx) => CreateLeaseHandler.check(ctx, state, tx),
        TxPayload::CloseDeployment(tx) => CloseDeploymentHandler.check(ctx, state, tx),
    }
}

/// Route a payload to its handler's `deliver`.
pub fn deliver<D: KvStore>(
    ctx: &TxContext,
    state: &mut State<D>,
    payload: &TxPayload,
) -> Result<Vec<MarketEvent>> {
    match payload {
        TxPayload::CreateOrder(tx) => CreateOrderHandler.deliver(ctx, state, tx),
        TxPayload::CreateLease(tx) => CreateLeaseHandler.deliver(ctx, state, tx),
        TxPayload::CloseDeployment(tx) => CloseDeploymentHandler.deliver(ctx, state, tx),
    }
}
