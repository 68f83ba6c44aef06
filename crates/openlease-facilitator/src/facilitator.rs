//! One facilitator run: propose against a committed snapshot, then send
//! every proposal in order.
//!
//! The first signing or broadcast failure aborts the rest of the run.
//! Whatever was not sent still holds in state and is proposed again on the
//! next trigger, and the next run re-seeds its nonce from the chain.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use openlease_engine::MarketEngine;
use openlease_state::{KvRead, Snapshot, State};
use openlease_types::{Address, FacilitatorConfig, Result};

use crate::{BroadcastClient, Sender, Signer};

/// Something that can be run against a finalized snapshot.
pub trait StateRunner: Send + Sync {
    fn run(&self, snapshot: Snapshot) -> Result<()>;
}

/// What one run did, for monitoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub height: u64,
    pub proposed: usize,
    pub sent: usize,
    /// Last nonce consumed by this run.
    pub nonce: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct Facilitator<S, C> {
    engine: MarketEngine,
    signer: S,
    client: C,
    default_nonce: u64,
    enabled: bool,
}

impl<S: Signer, C: BroadcastClient> Facilitator<S, C> {
    pub fn new(signer: S, client: C, config: &FacilitatorConfig) -> Self {
        Self {
            engine: MarketEngine::new(),
            signer,
            client,
            default_nonce: config.default_nonce,
            enabled: config.enabled,
        }
    }

    /// Actor address this facilitator signs as.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Propose against `state` and send the proposals sequentially.
    ///
    /// A disabled facilitator reports an empty run without proposing.
    pub fn run_on<D: KvRead>(&self, state: &mut State<D>) -> Result<RunReport> {
        let run_id = Uuid::now_v7();
        let started_at = Utc::now();
        let height = state.version();

        let nonce = state
            .accounts()
            .get(&self.address())?
            .map_or(self.default_nonce, |acct| acct.nonce);
        if !self.enabled {
            debug!(%run_id, height, "facilitator disabled, skipping");
            return Ok(RunReport {
                run_id,
                height,
                proposed: 0,
                sent: 0,
                nonce,
                started_at,
                finished_at: Utc::now(),
            });
        }
        let txs = self.engine.propose(state)?;
        let proposed = txs.len();

        let sender = Sender::new(&self.signer, &self.client, nonce);
        let mut sent = 0;
        for tx in txs {
            if let Err(err) = sender.send(tx) {
                warn!(%run_id, height, proposed, sent, error = %err, "facilitator run aborted");
                return Err(err);
            }
            sent += 1;
        }

        let report = RunReport {
            run_id,
            height,
            proposed,
            sent,
            nonce: sender.nonce(),
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            run_id = %report.run_id,
            height,
            proposed,
            sent,
            nonce = report.nonce,
            "facilitator run"
        );
        Ok(report)
    }
}

impl<S: Signer, C: BroadcastClient> StateRunner for Facilitator<S, C> {
    fn run(&self, snapshot: Snapshot) -> Result<()> {
        self.run_on(&mut State::new(snapshot)).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use openlease_state::MerkleStore;
    use openlease_types::{
        Account, Deployment, Group, GroupId, OpenleaseError, OrderId, SignedTx, TxPayload,
    };

    use super::*;
    use crate::Ed25519Signer;

    /// Records every broadcast; fails once `limit` is reached.
    #[derive(Default)]
    struct Recorder {
        limit: Option<usize>,
        txs: Mutex<Vec<SignedTx>>,
    }

    impl BroadcastClient for Recorder {
        fn broadcast(&self, tx: Vec<u8>) -> Result<()> {
            let mut txs = self.txs.lock().unwrap();
            if self.limit.is_some_and(|limit| txs.len() >= limit) {
                return Err(OpenleaseError::Broadcast("mempool full".into()));
            }
            txs.push(SignedTx::from_bytes(&tx)?);
            Ok(())
        }
    }

    /// Committed snapshot with `groups` OPEN groups on one deployment.
    fn snapshot(groups: u64, actor: Option<Account>) -> Snapshot {
        let mut store = MerkleStore::new(4);
        {
            let mut state = State::new(&mut store);
            let dep = Address::repeat(1);
            state
                .deployments()
                .save(&Deployment::dummy(dep, Address::repeat(9)))
                .unwrap();
            for seq in 1..=groups {
                state.groups().save(&Group::dummy(dep, seq, 3)).unwrap();
            }
            if let Some(acct) = actor {
                state.accounts().save(&acct).unwrap();
            }
        }
        store.commit();
        store.snapshot()
    }

    fn facilitator(limit: Option<usize>) -> Facilitator<Ed25519Signer, Recorder> {
        with_config(limit, &FacilitatorConfig::default())
    }

    fn with_config(
        limit: Option<usize>,
        config: &FacilitatorConfig,
    ) -> Facilitator<Ed25519Signer, Recorder> {
        Facilitator::new(
            Ed25519Signer::from_bytes(&[7u8; 32]),
            Recorder {
                limit,
                ..Recorder::default()
            },
            config,
        )
    }

    #[test]
    fn missing_actor_account_starts_from_default_nonce() {
        let f = facilitator(None);
        let report = f.run_on(&mut State::new(snapshot(2, None))).unwrap();
        assert_eq!(report.proposed, 2);
        assert_eq!(report.sent, 2);

        let txs = f.client().txs.lock().unwrap();
        let nonces: Vec<u64> = txs.iter().map(|t| t.nonce).collect();
        assert_eq!(nonces, vec![2, 3]);
        assert!(txs.iter().all(|t| t.signer() == f.address()));
        assert!(matches!(
            &txs[0].payload,
            TxPayload::CreateOrder(tx) if tx.id == OrderId::new(GroupId::new(Address::repeat(1), 1), 1)
        ));
    }

    #[test]
    fn existing_actor_account_seeds_the_nonce() {
        let f = facilitator(None);
        let actor = Account {
            address: f.address(),
            balance: 0,
            nonce: 41,
        };
        let report = f.run_on(&mut State::new(snapshot(1, Some(actor)))).unwrap();
        assert_eq!(report.nonce, 42);
    }

    #[test]
    fn broadcast_failure_aborts_remaining_sends() {
        let f = facilitator(Some(1));
        let err = f.run_on(&mut State::new(snapshot(3, None))).unwrap_err();
        assert!(err.to_string().starts_with("OL_ERR_401"));
        assert_eq!(f.client().txs.lock().unwrap().len(), 1);
    }

    #[test]
    fn disabled_facilitator_proposes_nothing() {
        let config = FacilitatorConfig {
            enabled: false,
            ..FacilitatorConfig::default()
        };
        let f = with_config(None, &config);
        assert!(!f.is_enabled());
        let report = f.run_on(&mut State::new(snapshot(2, None))).unwrap();
        assert_eq!((report.proposed, report.sent), (0, 0));
        assert_eq!(report.nonce, config.default_nonce);
        assert!(f.client().txs.lock().unwrap().is_empty());
    }

    #[test]
    fn quiet_market_sends_nothing() {
        let f = facilitator(None);
        let report = f.run_on(&mut State::new(snapshot(0, None))).unwrap();
        assert_eq!(report.proposed, 0);
        assert!(report.finished_at >= report.started_at);
        assert_eq!(report.run_id.get_version_num(), 7);
    }
}
