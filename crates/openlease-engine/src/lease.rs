//! Lease sub-engine: balance-zero billing.
//!
//! Every ACTIVE lease whose deployment is still ACTIVE is checked against
//! the deployment tenant's balance. A zero balance closes the deployment
//! (one close per deployment, however many leases it has). A tenant with
//! no account yet counts as a zero balance.

use std::collections::BTreeSet;

use tracing::debug;

use openlease_state::{KvRead, KvStore, State};
use openlease_types::{CloseReason, MarketEvent, Result};

use crate::{MarketAction, mutations};

#[derive(Debug, Default, Clone, Copy)]
pub struct LeaseEngine;

impl LeaseEngine {
    pub fn plan<D: KvRead>(self, state: &mut State<D>) -> Result<Vec<MarketAction>> {
        let mut closing = BTreeSet::new();
        let mut actions = Vec::new();

        for lease in state.leases().active()? {
            let deployment = state.deployments().must_get(&lease.id.deployment)?;
            if !deployment.is_active() || closing.contains(&deployment.address) {
                continue;
            }
            let balance = state
                .accounts()
                .get(&deployment.tenant)?
                .map_or(0, |acct| acct.balance);
            if balance == 0 {
                debug!(
                    deployment = %deployment.address,
                    tenant = %deployment.tenant.short(),
                    "tenant out of funds"
                );
                closing.insert(deployment.address);
                actions.push(MarketAction::CloseDeployment {
                    deployment: deployment.address,
                    reason: CloseReason::InsufficientFunds,
                });
            }
        }
        Ok(actions)
    }

    /// Plan and apply in one step; used inside the state transition.
    pub fn run<D: KvStore>(self, state: &mut State<D>) -> Result<Vec<MarketEvent>> {
        let mut events = Vec::new();
        for action in self.plan(state)? {
            if let MarketAction::CloseDeployment { deployment, reason } = action {
                events.extend(mutations::close_deployment(state, deployment, reason)?);
            }
        }
        Ok(events)
    }
}
