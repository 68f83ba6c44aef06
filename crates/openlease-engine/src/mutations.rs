//! Ledger mutations shared by the engine's direct path and the transaction
//! handlers. Callers validate first; these only re-check what keeps the
//! ledger consistent.

use tracing::debug;

use openlease_state::{KvStore, State};
use openlease_types::{
    Address, CloseReason, DeploymentState, FulfillmentState, GroupState, Lease, LeaseId,
    LeaseState, MarketEvent, OpenleaseError, Order, OrderId, OrderState, Result,
};

/// Advance the deployment's order sequence and save a new OPEN order.
///
/// `id.seq` must be the value the sequence hands out next.
pub fn create_order<D: KvStore>(
    state: &mut State<D>,
    id: OrderId,
    end_at: u64,
) -> Result<MarketEvent> {
    let mut deployments = state.deployments();
    let mut sequence = deployments.sequence_for(id.deployment);
    let next = sequence.next()?;
    if next != id.seq {
        return Err(OpenleaseError::invalid(format!(
            "order sequence mismatch: expected {next}, got {}",
            id.seq
        )));
    }
    sequence.advance()?;
    let order = Order {
        id,
        state: OrderState::Open,
        end_at,
    };
    state.orders().save(&order)?;
    debug!(order = %id, end_at, "order created");
    Ok(MarketEvent::OrderCreate { id, end_at })
}

/// Bind an order to the fulfillment `id` at `price`.
pub fn create_lease<D: KvStore>(
    state: &mut State<D>,
    id: LeaseId,
    price: u64,
) -> Result<MarketEvent> {
    let mut order = state.orders().must_get(&id.order_id())?;
    let mut fulfillment = state.fulfillments().must_get(&id)?;
    let mut group = state.groups().must_get(&id.group_id())?;

    state.leases().save(&Lease {
        id,
        price,
        state: LeaseState::Active,
    })?;

    order.state = OrderState::Matched;
    state.orders().save(&order)?;

    fulfillment.state = FulfillmentState::Matched;
    state.fulfillments().save(&fulfillment)?;

    group.state = GroupState::Matched;
    state.groups().save(&group)?;

    debug!(lease = %id, price, "lease created");
    Ok(MarketEvent::LeaseCreate { id, price })
}

/// Close a deployment and everything hanging off it.
///
/// Every ACTIVE lease is closed with one `lease-close` event. Closing an
/// already CLOSED deployment is a no-op.
pub fn close_deployment<D: KvStore>(
    state: &mut State<D>,
    address: Address,
    reason: CloseReason,
) -> Result<Vec<MarketEvent>> {
    let mut deployment = state.deployments().must_get(&address)?;
    if deployment.state == DeploymentState::Closed {
        return Ok(Vec::new());
    }
    deployment.state = DeploymentState::Closed;
    state.deployments().save(&deployment)?;

    let mut events = Vec::new();
    for mut lease in state.leases().for_deployment(address)? {
        if !lease.is_active() {
            continue;
        }
        lease.state = LeaseState::Closed;
        state.leases().save(&lease)?;
        events.push(MarketEvent::LeaseClose { id: lease.id, reason });
    }

    for mut order in state.orders().for_deployment(address)? {
        if order.state == OrderState::Open {
            order.state = OrderState::Closed;
            state.orders().save(&order)?;
        }
    }

    let group_state = match reason {
        CloseReason::Tenant => GroupState::Closed,
        CloseReason::InsufficientFunds => GroupState::InsufficientFunds,
    };
    for mut group in state.groups().for_deployment(address)? {
        if group.state != GroupState::Closed {
            group.state = group_state;
            state.groups().save(&group)?;
        }
    }

    debug!(deployment = %address, %reason, leases = events.len(), "deployment closed");
    Ok(events)
}
