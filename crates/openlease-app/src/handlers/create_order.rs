//! `CreateOrder`: open the next order for an OPEN group.
//!
//! `end_at` is not checked against the current height. A zero-TTL group
//! gets orders ending at the proposal height, and a late order is simply
//! matchable at once.

use openlease_engine::mutations;
use openlease_state::{KvRead, KvStore, State};
use openlease_types::{MarketEvent, OpenleaseError, OrderState, Result, TxCreateOrder};

use super::TxHandler;
use crate::TxContext;

#[derive(Debug, Default, Clone, Copy)]
pub struct CreateOrderHandler;

impl TxHandler for CreateOrderHandler {
    type Tx = TxCreateOrder;

    fn check<D: KvRead>(
        &self,
        _ctx: &TxContext,
        state: &mut State<D>,
        tx: &TxCreateOrder,
    ) -> Result<()> {
        // 1. Deployment exists and is ACTIVE
        let deployment = state
            .deployments()
            .get(&tx.id.deployment)?
            .ok_or_else(|| OpenleaseError::invalid("deployment not found"))?;
        if !deployment.is_active() {
            return Err(OpenleaseError::invalid("deployment not active"));
        }

        // 2. Group exists and is OPEN
        let group = state
            .groups()
            .get(&tx.id.group_id())?
            .ok_or_else(|| OpenleaseError::invalid("group not found"))?;
        if !group.is_open() {
            return Err(OpenleaseError::invalid(format!(
                "group not open: {}",
                group.state
            )));
        }

        // 3. At most one OPEN order per group
        let orders = state.orders().for_group(group.id)?;
        if orders.iter().any(|o| o.state == OrderState::Open) {
            return Err(OpenleaseError::invalid("group already has an open order"));
        }

        // 4. Sequence is the deployment's next one
        let mut deployments = state.deployments();
        let next = deployments.sequence_for(tx.id.deployment).next()?;
        if tx.id.seq != next {
            return Err(OpenleaseError::invalid(format!(
                "order sequence mismatch: expected {next}, got {}",
                tx.id.seq
            )));
        }
        Ok(())
    }

    fn apply<D: KvStore>(
        &self,
        _ctx: &TxContext,
        state: &mut State<D>,
        tx: &TxCreateOrder,
    ) -> Result<Vec<MarketEvent>> {
        Ok(vec![mutations::create_order(state, tx.id, tx.end_at)?])
    }
}

#[cfg(test)]
mod tests {
    use openlease_state::MerkleStore;
    use openlease_types::{Address, Deployment, Group, GroupId, GroupState, OrderId};

    use super::*;

    const DEP: Address = Address([1u8; 32]);

    fn seeded() -> State<MerkleStore> {
        let mut state = State::new(MerkleStore::new(1));
        state
            .deployments()
            .save(&Deployment::dummy(DEP, Address::repeat(9)))
            .unwrap();
        state.groups().save(&Group::dummy(DEP, 1, 5)).unwrap();
        state
    }

    fn tx(seq: u64, end_at: u64) -> TxCreateOrder {
        TxCreateOrder {
            id: OrderId::new(GroupId::new(DEP, 1), seq),
            end_at,
        }
    }

    fn ctx(height: u64) -> TxContext {
        TxContext::new(Address::repeat(7), height)
    }

    #[test]
    fn deliver_saves_open_order() {
        let mut state = seeded();
        let events = CreateOrderHandler.deliver(&ctx(0), &mut state, &tx(1, 5)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), "order-create");
        let order = state.orders().must_get(&tx(1, 5).id).unwrap();
        assert_eq!(order.state, OrderState::Open);
    }

    #[test]
    fn second_open_order_is_rejected() {
        let mut state = seeded();
        CreateOrderHandler.deliver(&ctx(0), &mut state, &tx(1, 5)).unwrap();
        let err = CreateOrderHandler.check(&ctx(0), &mut state, &tx(2, 5)).unwrap_err();
        assert!(err.to_string().contains("already has an open order"), "Got: {err}");
    }

    #[test]
    fn stale_sequence_is_rejected() {
        let mut state = seeded();
        let err = CreateOrderHandler.check(&ctx(0), &mut state, &tx(3, 5)).unwrap_err();
        assert!(err.is_rejection());
        assert!(err.to_string().contains("sequence mismatch"));
    }

    #[test]
    fn order_ending_at_or_before_height_is_accepted() {
        let mut state = seeded();
        CreateOrderHandler.check(&ctx(5), &mut state, &tx(1, 5)).unwrap();
        CreateOrderHandler.check(&ctx(9), &mut state, &tx(1, 5)).unwrap();
    }

    #[test]
    fn matched_group_is_rejected() {
        let mut state = seeded();
        let mut group = state.groups().must_get(&GroupId::new(DEP, 1)).unwrap();
        group.state = GroupState::Matched;
        state.groups().save(&group).unwrap();
        let err = CreateOrderHandler.check(&ctx(0), &mut state, &tx(1, 5)).unwrap_err();
        assert!(err.to_string().contains("group not open"));
    }

    #[test]
    fn unknown_deployment_is_a_rejection_not_a_failure() {
        let mut state = State::new(MerkleStore::new(1));
        let err = CreateOrderHandler.check(&ctx(0), &mut state, &tx(1, 5)).unwrap_err();
        assert!(err.is_rejection());
    }
}
