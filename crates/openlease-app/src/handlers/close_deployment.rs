//! `CloseDeployment`: a tenant closing its own deployment, or anyone
//! closing one whose tenant has run out of funds.

use openlease_engine::mutations;
use openlease_state::{KvRead, KvStore, State};
use openlease_types::{CloseReason, MarketEvent, OpenleaseError, Result, TxCloseDeployment};

use super::TxHandler;
use crate::TxContext;

#[derive(Debug, Default, Clone, Copy)]
pub struct CloseDeploymentHandler;

impl TxHandler for CloseDeploymentHandler {
    type Tx = TxCloseDeployment;

    fn check<D: KvRead>(
        &self,
        ctx: &TxContext,
        state: &mut State<D>,
        tx: &TxCloseDeployment,
    ) -> Result<()> {
        let deployment = state
            .deployments()
            .get(&tx.deployment)?
            .ok_or_else(|| OpenleaseError::invalid("deployment not found"))?;
        if !deployment.is_active() {
            return Err(OpenleaseError::invalid("deployment not active"));
        }

        match tx.reason {
            CloseReason::Tenant if ctx.signer != deployment.tenant => Err(OpenleaseError::invalid(
                format!("signer {} is not the tenant", ctx.signer.short()),
            )),
            CloseReason::Tenant => Ok(()),
            CloseReason::InsufficientFunds => {
                let balance = state
                    .accounts()
                    .get(&deployment.tenant)?
                    .map_or(0, |acct| acct.balance);
                if balance == 0 {
                    Ok(())
                } else {
                    Err(OpenleaseError::invalid(format!(
                        "tenant still holds {balance}"
                    )))
                }
            }
        }
    }

    fn apply<D: KvStore>(
        &self,
        _ctx: &TxContext,
        state: &mut State<D>,
        tx: &TxCloseDeployment,
    ) -> Result<Vec<MarketEvent>> {
        mutations::close_deployment(state, tx.deployment, tx.reason)
    }
}
