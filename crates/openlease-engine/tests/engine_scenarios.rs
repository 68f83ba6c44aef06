//! End-to-end engine behaviour over a real store.

use openlease_engine::{MarketAction, MarketEngine};
use openlease_state::{MerkleStore, State};
use openlease_types::{
    Account, Address, CloseReason, Deployment, DeploymentState, Fulfillment, FulfillmentId,
    FulfillmentState, Group, GroupId, GroupState, Lease, LeaseState, MarketEvent, Order, OrderId,
    OrderState, TxPayload,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const DEP: Address = Address([1u8; 32]);
const TENANT: Address = Address([9u8; 32]);

/// A store whose last committed version is `height`, holding one ACTIVE
/// deployment with one OPEN group and a funded tenant.
fn market_at(height: u64, ttl: u64) -> MerkleStore {
    let mut store = MerkleStore::new(16);
    {
        let mut state = State::new(&mut store);
        state
            .accounts()
            .save(&Account::new(TENANT).with_balance(1_000))
            .unwrap();
        state.deployments().save(&Deployment::dummy(DEP, TENANT)).unwrap();
        state.groups().save(&Group::dummy(DEP, 1, ttl)).unwrap();
    }
    for _ in 0..height {
        store.commit();
    }
    store
}

fn group() -> GroupId {
    GroupId::new(DEP, 1)
}

/// Save an OPEN order and advance the deployment sequence past it.
fn seed_order(store: &mut MerkleStore, seq: u64, end_at: u64, state: OrderState) -> OrderId {
    let mut s = State::new(store);
    let id = OrderId::new(group(), seq);
    s.orders().save(&Order { id, state, end_at }).unwrap();
    let mut deployments = s.deployments();
    let mut sequence = deployments.sequence_for(DEP);
    while sequence.current().unwrap() < seq {
        sequence.advance().unwrap();
    }
    id
}

fn seed_bid(store: &mut MerkleStore, order: OrderId, provider: u8, price: u64) -> FulfillmentId {
    let id = FulfillmentId::new(order, Address::repeat(provider));
    State::new(store)
        .fulfillments()
        .save(&Fulfillment {
            id,
            price,
            state: FulfillmentState::Open,
        })
        .unwrap();
    id
}

// ---------------------------------------------------------------------------
// Order creation
// ---------------------------------------------------------------------------

#[test]
fn open_group_without_order_gets_exactly_one() {
    init_tracing();
    let mut store = market_at(3, 5);
    let mut state = State::new(&mut store);

    let out = MarketEngine::new().run(&mut state).unwrap();
    assert_eq!(out.count("order-create"), 1);

    let orders = state.orders().for_group(group()).unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].state, OrderState::Open);
    assert_eq!(orders[0].end_at, 3 + 5);
    assert_eq!(orders[0].id.seq, 1);

    // Same height again: the open order holds the group.
    let again = MarketEngine::new().run(&mut state).unwrap();
    assert!(again.events.is_empty());
}

#[test]
fn closed_but_unexpired_prior_order_blocks_creation() {
    let mut store = market_at(2, 5);
    seed_order(&mut store, 1, 10, OrderState::Closed);
    let mut state = State::new(&mut store);
    let out = MarketEngine::new().run(&mut state).unwrap();
    assert_eq!(out.count("order-create"), 0);
}

#[test]
fn closed_and_expired_prior_order_allows_next_sequence() {
    let mut store = market_at(12, 5);
    seed_order(&mut store, 1, 10, OrderState::Closed);
    let mut state = State::new(&mut store);
    MarketEngine::new().run(&mut state).unwrap();
    let orders = state.orders().for_group(group()).unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[1].id.seq, 2);
    assert_eq!(orders[1].end_at, 17);
}

#[test]
fn groups_of_one_deployment_share_the_sequence() {
    let mut store = market_at(0, 5);
    State::new(&mut store)
        .groups()
        .save(&Group::dummy(DEP, 2, 5))
        .unwrap();
    let mut state = State::new(&mut store);
    MarketEngine::new().run(&mut state).unwrap();
    let seqs: Vec<(u64, u64)> = state
        .orders()
        .for_deployment(DEP)
        .unwrap()
        .iter()
        .map(|o| (o.id.group, o.id.seq))
        .collect();
    assert_eq!(seqs, vec![(1, 1), (2, 2)]);
}

#[test]
fn closed_deployments_are_ignored() {
    let mut store = market_at(0, 5);
    let mut state = State::new(&mut store);
    let mut dep = state.deployments().must_get(&DEP).unwrap();
    dep.state = DeploymentState::Closed;
    state.deployments().save(&dep).unwrap();
    let out = MarketEngine::new().run(&mut state).unwrap();
    assert!(out.actions.is_empty());
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[test]
fn expired_order_matches_cheapest_bid() {
    init_tracing();
    let mut store = market_at(6, 5);
    let order = seed_order(&mut store, 1, 5, OrderState::Open);
    seed_bid(&mut store, order, 1, 30);
    let cheapest = seed_bid(&mut store, order, 2, 10);
    seed_bid(&mut store, order, 3, 20);

    let mut state = State::new(&mut store);
    let out = MarketEngine::new().run(&mut state).unwrap();
    assert_eq!(
        out.events,
        vec![MarketEvent::LeaseCreate {
            id: cheapest,
            price: 10
        }]
    );

    let lease = state.leases().must_get(&cheapest).unwrap();
    assert_eq!(lease.price, 10);
    assert_eq!(lease.state, LeaseState::Active);
    assert_eq!(state.orders().must_get(&order).unwrap().state, OrderState::Matched);
    assert_eq!(state.groups().must_get(&group()).unwrap().state, GroupState::Matched);
}

#[test]
fn expired_order_without_bids_is_left_alone() {
    let mut store = market_at(6, 5);
    let order = seed_order(&mut store, 1, 5, OrderState::Open);
    let mut state = State::new(&mut store);

    let out = MarketEngine::new().run(&mut state).unwrap();
    assert!(out.events.is_empty());
    assert_eq!(state.orders().must_get(&order).unwrap().state, OrderState::Open);
    assert!(state.leases().all().unwrap().is_empty());
}

#[test]
fn unexpired_order_is_not_matched() {
    let mut store = market_at(4, 5);
    let order = seed_order(&mut store, 1, 5, OrderState::Open);
    seed_bid(&mut store, order, 1, 30);
    let mut state = State::new(&mut store);
    let out = MarketEngine::new().run(&mut state).unwrap();
    assert!(out.events.is_empty());
}

// ---------------------------------------------------------------------------
// Billing
// ---------------------------------------------------------------------------

fn seed_active_lease(store: &mut MerkleStore) -> FulfillmentId {
    let order = seed_order(store, 1, 0, OrderState::Matched);
    let id = FulfillmentId::new(order, Address::repeat(4));
    let mut state = State::new(store);
    state
        .leases()
        .save(&Lease {
            id,
            price: 7,
            state: LeaseState::Active,
        })
        .unwrap();
    let mut g = state.groups().must_get(&group()).unwrap();
    g.state = GroupState::Matched;
    state.groups().save(&g).unwrap();
    id
}

#[test]
fn broke_tenant_closes_deployment_once() {
    init_tracing();
    let mut store = market_at(3, 5);
    let lease = seed_active_lease(&mut store);
    State::new(&mut store)
        .accounts()
        .save(&Account::new(TENANT))
        .unwrap();

    let mut state = State::new(&mut store);
    let out = MarketEngine::new().run(&mut state).unwrap();
    assert_eq!(
        out.events,
        vec![MarketEvent::LeaseClose {
            id: lease,
            reason: CloseReason::InsufficientFunds
        }]
    );
    assert_eq!(
        state.deployments().must_get(&DEP).unwrap().state,
        DeploymentState::Closed
    );

    let second = MarketEngine::new().run(&mut state).unwrap();
    assert!(second.events.is_empty());
    assert_eq!(
        state.deployments().must_get(&DEP).unwrap().state,
        DeploymentState::Closed
    );
}

#[test]
fn funded_tenant_keeps_lease() {
    let mut store = market_at(3, 5);
    let lease = seed_active_lease(&mut store);
    let mut state = State::new(&mut store);
    let out = MarketEngine::new().run(&mut state).unwrap();
    assert_eq!(out.count("lease-close"), 0);
    assert!(state.leases().must_get(&lease).unwrap().is_active());
}

#[test]
fn lease_for_missing_deployment_is_an_error() {
    let mut store = MerkleStore::new(1);
    let id = FulfillmentId::new(
        OrderId::new(GroupId::new(Address::repeat(7), 1), 1),
        Address::repeat(4),
    );
    State::new(&mut store)
        .leases()
        .save(&Lease {
            id,
            price: 1,
            state: LeaseState::Active,
        })
        .unwrap();
    let err = MarketEngine::new()
        .run(&mut State::new(&mut store))
        .unwrap_err();
    assert!(err.to_string().starts_with("OL_ERR_103"));
}

// ---------------------------------------------------------------------------
// Proposals
// ---------------------------------------------------------------------------

#[test]
fn propose_reads_snapshot_and_emits_only_new_activity() {
    let mut store = market_at(6, 5);
    let order = seed_order(&mut store, 1, 5, OrderState::Open);
    let bid = seed_bid(&mut store, order, 2, 10);

    // A second deployment with a broke tenant and an active lease.
    let broke = Address::repeat(3);
    {
        let mut state = State::new(&mut store);
        state.deployments().save(&Deployment::dummy(broke, broke)).unwrap();
        state
            .leases()
            .save(&Lease {
                id: FulfillmentId::new(OrderId::new(GroupId::new(broke, 1), 1), Address::repeat(4)),
                price: 1,
                state: LeaseState::Active,
            })
            .unwrap();
    }
    store.commit();

    let mut snap = State::new(store.snapshot());
    let txs = MarketEngine::new().propose(&mut snap).unwrap();
    assert_eq!(txs.len(), 1);
    assert!(matches!(&txs[0], TxPayload::CreateLease(tx) if tx.id == bid && tx.price == 10));

    // Nothing was written.
    assert!(snap.leases().get(&bid).unwrap().is_none());
    assert!(snap.deployments().must_get(&broke).unwrap().is_active());
}

#[test]
fn run_records_its_actions() {
    let mut store = market_at(0, 2);
    let out = MarketEngine::new().run(&mut State::new(&mut store)).unwrap();
    assert_eq!(
        out.actions,
        vec![MarketAction::CreateOrder {
            id: OrderId::new(group(), 1),
            end_at: 2
        }]
    );
}
