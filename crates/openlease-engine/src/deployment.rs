//! Deployment sub-engine: order creation and order → lease matching.
//!
//! For every ACTIVE deployment and every OPEN group:
//!
//! ```text
//!   no OPEN/MATCHED order  &&  (no prior order || prior expired)
//!       ──▶ CreateOrder { seq = next, end_at = height + group.order_ttl }
//!   OPEN order with end_at <= height  &&  cheapest OPEN bid exists
//!       ──▶ CreateLease { id = bid.id, price = bid.price }
//! ```
//!
//! Order sequences are per deployment, so two groups of one deployment
//! receive consecutive sequence numbers in the same pass.

use openlease_state::{KvRead, State};
use openlease_types::{Order, OrderId, OrderState, Result};

use crate::{MarketAction, best_fulfillment};

#[derive(Debug, Default, Clone, Copy)]
pub struct DeploymentEngine;

impl DeploymentEngine {
    /// Decide order creations and matches for the current height.
    pub fn plan<D: KvRead>(self, state: &mut State<D>) -> Result<Vec<MarketAction>> {
        let height = state.version();
        let mut actions = Vec::new();

        for deployment in state.deployments().active()? {
            let mut next_seq = state
                .deployments()
                .sequence_for(deployment.address)
                .next()?;

            for group in state.groups().for_deployment(deployment.address)? {
                if !group.is_open() {
                    continue;
                }
                let orders = state.orders().for_group(group.id)?;

                for order in orders.iter().filter(|o| is_matchable(o, height)) {
                    let bids = state.fulfillments().for_order(order.id)?;
                    if let Some(best) = best_fulfillment(&bids) {
                        actions.push(MarketAction::CreateLease {
                            id: best.lease_id(),
                            price: best.price,
                        });
                    }
                }

                let has_active = orders.iter().any(Order::is_active);
                let prior_expired = orders.last().is_none_or(|o| o.is_expired_at(height));
                if !has_active && prior_expired {
                    actions.push(MarketAction::CreateOrder {
                        id: OrderId::new(group.id, next_seq),
                        end_at: height.saturating_add(group.order_ttl),
                    });
                    next_seq = next_seq.saturating_add(1);
                }
            }
        }
        Ok(actions)
    }
}

fn is_matchable(order: &Order, height: u64) -> bool {
    order.state == OrderState::Open && order.is_expired_at(height)
}
