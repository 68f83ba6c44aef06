//! The market engine: both sub-engines behind two entry points.
//!
//! ```text
//!   run(state)      plan ──▶ apply every action directly ──▶ events
//!                   (inside the state transition, or in tests)
//!
//!   propose(state)  plan ──▶ CreateOrder / CreateLease payloads
//!                   (facilitator; payloads re-enter the tx pipeline)
//! ```
//!
//! Closing deployments for non-payment mutates committed ledger state, so
//! it is never proposed; the transition runs [`LeaseEngine::run`] itself.

use tracing::info;

use openlease_state::{KvRead, KvStore, State};
use openlease_types::{MarketEvent, Result, TxPayload};

use crate::{DeploymentEngine, LeaseEngine, MarketAction, mutations};

/// Everything one direct run did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EngineOutput {
    pub actions: Vec<MarketAction>,
    pub events: Vec<MarketEvent>,
}

impl EngineOutput {
    /// Events of one kind (`order-create`, `lease-create`, `lease-close`).
    #[must_use]
    pub fn count(&self, kind: &str) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MarketEngine {
    deployments: DeploymentEngine,
    leases: LeaseEngine,
}

impl MarketEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan and apply both sub-engines against `state`.
    pub fn run<D: KvStore>(&self, state: &mut State<D>) -> Result<EngineOutput> {
        let mut out = EngineOutput::default();

        let planned = self.deployments.plan(state)?;
        for action in planned {
            let event = match &action {
                MarketAction::CreateOrder { id, end_at } => {
                    mutations::create_order(state, *id, *end_at)?
                }
                MarketAction::CreateLease { id, price } => {
                    mutations::create_lease(state, *id, *price)?
                }
                MarketAction::CloseDeployment { .. } => continue,
            };
            out.events.push(event);
            out.actions.push(action);
        }

        for action in self.leases.plan(state)? {
            if let MarketAction::CloseDeployment { deployment, reason } = &action {
                out.events
                    .extend(mutations::close_deployment(state, *deployment, *reason)?);
            }
            out.actions.push(action);
        }

        info!(
            height = state.version(),
            orders = out.count("order-create"),
            leases = out.count("lease-create"),
            closed = out.count("lease-close"),
            "engine run"
        );
        Ok(out)
    }

    /// Candidate transactions for new economic activity only.
    pub fn propose<D: KvRead>(&self, state: &mut State<D>) -> Result<Vec<TxPayload>> {
        let txs: Vec<TxPayload> = self
            .deployments
            .plan(state)?
            .into_iter()
            .filter(MarketAction::is_proposal)
            .map(MarketAction::into_tx)
            .collect();
        info!(height = state.version(), proposed = txs.len(), "engine proposal");
        Ok(txs)
    }
}
