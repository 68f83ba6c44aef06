//! `CreateLease`: bind an expired order to its winning bid.
//!
//! The only acceptable fulfillment is the one the matching engine itself
//! would pick, so a facilitator cannot steer a lease to a pricier bid.
//! Group requirements are not consulted here: they gate bidding, and the
//! engine picks among the OPEN bids of the order without them.

use openlease_engine::{best_fulfillment, mutations};
use openlease_state::{KvRead, KvStore, State};
use openlease_types::{
    FulfillmentState, MarketEvent, OpenleaseError, OrderState, Result, TxCreateLease,
};

use super::TxHandler;
use crate::TxContext;

#[derive(Debug, Default, Clone, Copy)]
pub struct CreateLeaseHandler;

impl TxHandler for CreateLeaseHandler {
    type Tx = TxCreateLease;

    fn check<D: KvRead>(
        &self,
        ctx: &TxContext,
        state: &mut State<D>,
        tx: &TxCreateLease,
    ) -> Result<()> {
        // 1. Provider is registered and its owner account exists
        let provider = state
            .providers()
            .get(&tx.id.provider)?
            .ok_or_else(|| OpenleaseError::invalid("provider not found"))?;
        if state.accounts().get(&provider.owner)?.is_none() {
            return Err(OpenleaseError::invalid("provider account not found"));
        }

        // 2. Order exists, is OPEN and has expired
        let order = state
            .orders()
            .get(&tx.id.order_id())?
            .ok_or_else(|| OpenleaseError::invalid("order not found"))?;
        if order.state != OrderState::Open {
            return Err(OpenleaseError::invalid(format!(
                "order not open: {}",
                order.state
            )));
        }
        if !order.is_expired_at(ctx.height) {
            return Err(OpenleaseError::invalid(format!(
                "order open until {}, height is {}",
                order.end_at, ctx.height
            )));
        }

        // 3. Fulfillment exists, is OPEN and carries the lease price
        let fulfillment = state
            .fulfillments()
            .get(&tx.id)?
            .ok_or_else(|| OpenleaseError::invalid("fulfillment not found"))?;
        if fulfillment.state != FulfillmentState::Open {
            return Err(OpenleaseError::invalid(format!(
                "fulfillment not open: {}",
                fulfillment.state
            )));
        }
        if fulfillment.price != tx.price {
            return Err(OpenleaseError::invalid(format!(
                "price {} does not match bid {}",
                tx.price, fulfillment.price
            )));
        }

        // 4. It is the winning bid
        let bids = state.fulfillments().for_order(order.id)?;
        match best_fulfillment(&bids) {
            Some(best) if best.id == fulfillment.id => Ok(()),
            _ => Err(OpenleaseError::invalid("unexpected fulfillment")),
        }
    }

    fn apply<D: KvStore>(
        &self,
        _ctx: &TxContext,
        state: &mut State<D>,
        tx: &TxCreateLease,
    ) -> Result<Vec<MarketEvent>> {
        Ok(vec![mutations::create_lease(state, tx.id, tx.price)?])
    }
}

#[cfg(test)]
mod tests {
    use openlease_state::MerkleStore;
    use openlease_types::{
        Account, Address, Deployment, Fulfillment, FulfillmentId, Group, GroupId, LeaseState,
        Order, OrderId, Provider, ProviderAttribute,
    };

    use super::*;

    const DEP: Address = Address([1u8; 32]);

    fn order_id() -> OrderId {
        OrderId::new(GroupId::new(DEP, 1), 1)
    }

    fn provider(state: &mut State<MerkleStore>, b: u8) -> Address {
        let address = Address::repeat(b);
        let owner = Address::repeat(b + 100);
        state
            .providers()
            .save(&Provider {
                address,
                owner,
                host_uri: format!("https://p{b}.example"),
                attributes: vec![ProviderAttribute::new("region", "us-west")],
            })
            .unwrap();
        state.accounts().save(&Account::new(owner)).unwrap();
        address
    }

    fn bid(state: &mut State<MerkleStore>, b: u8, price: u64) -> FulfillmentId {
        let id = FulfillmentId::new(order_id(), provider(state, b));
        state
            .fulfillments()
            .save(&Fulfillment {
                id,
                price,
                state: FulfillmentState::Open,
            })
            .unwrap();
        id
    }

    /// One deployment, one group, one OPEN order ending at height 5.
    fn seeded() -> State<MerkleStore> {
        let mut state = State::new(MerkleStore::new(1));
        state
            .deployments()
            .save(&Deployment::dummy(DEP, Address::repeat(9)))
            .unwrap();
        state.groups().save(&Group::dummy(DEP, 1, 5)).unwrap();
        state
            .orders()
            .save(&Order {
                id: order_id(),
                state: OrderState::Open,
                end_at: 5,
            })
            .unwrap();
        state
    }

    fn ctx(height: u64) -> TxContext {
        TxContext::new(Address::repeat(7), height)
    }

    #[test]
    fn cheapest_bid_becomes_lease() {
        let mut state = seeded();
        bid(&mut state, 1, 30);
        let cheapest = bid(&mut state, 2, 10);
        let tx = TxCreateLease {
            id: cheapest,
            price: 10,
        };
        let events = CreateLeaseHandler.deliver(&ctx(5), &mut state, &tx).unwrap();
        assert_eq!(events, vec![MarketEvent::LeaseCreate { id: cheapest, price: 10 }]);
        assert_eq!(state.leases().must_get(&cheapest).unwrap().state, LeaseState::Active);
        assert_eq!(state.orders().must_get(&order_id()).unwrap().state, OrderState::Matched);
    }

    #[test]
    fn pricier_bid_is_rejected() {
        let mut state = seeded();
        let pricey = bid(&mut state, 1, 30);
        bid(&mut state, 2, 10);
        let tx = TxCreateLease { id: pricey, price: 30 };
        let err = CreateLeaseHandler.check(&ctx(5), &mut state, &tx).unwrap_err();
        assert!(err.to_string().contains("unexpected fulfillment"), "Got: {err}");
    }

    #[test]
    fn price_must_match_bid() {
        let mut state = seeded();
        let id = bid(&mut state, 1, 30);
        let tx = TxCreateLease { id, price: 1 };
        let err = CreateLeaseHandler.check(&ctx(5), &mut state, &tx).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn unexpired_order_is_rejected() {
        let mut state = seeded();
        let id = bid(&mut state, 1, 30);
        let tx = TxCreateLease { id, price: 30 };
        let err = CreateLeaseHandler.check(&ctx(4), &mut state, &tx).unwrap_err();
        assert!(err.to_string().contains("open until 5"));
    }

    #[test]
    fn unregistered_provider_is_rejected() {
        let mut state = seeded();
        let id = FulfillmentId::new(order_id(), Address::repeat(50));
        let tx = TxCreateLease { id, price: 1 };
        let err = CreateLeaseHandler.check(&ctx(5), &mut state, &tx).unwrap_err();
        assert!(err.to_string().contains("provider not found"));
    }

    #[test]
    fn winning_bid_is_accepted_whatever_the_group_requirements() {
        let mut state = seeded();
        let mut group = state.groups().must_get(&GroupId::new(DEP, 1)).unwrap();
        group.requirements = vec![ProviderAttribute::new("region", "eu-central")];
        state.groups().save(&group).unwrap();
        let id = bid(&mut state, 1, 30);
        let tx = TxCreateLease { id, price: 30 };
        CreateLeaseHandler.check(&ctx(5), &mut state, &tx).unwrap();
    }
}
