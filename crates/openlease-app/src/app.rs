//! `LedgerApp`: the block-by-block state transition.
//!
//! Writes for the current block accumulate in one [`Cache`] over the
//! [`MerkleStore`]. Each delivered transaction runs in a second-level
//! branch that is flushed into the block cache only when its handler
//! succeeds:
//!
//! ```text
//!   deliver_tx ─▶ nonce bump ──────────────▶ block Cache ──commit──▶ MerkleStore
//!             └─▶ handler ─▶ branch Cache ─┘ (on success)
//! ```
//!
//! A rejected transaction therefore leaves no partial writes, but its nonce
//! stays consumed.

use tracing::{debug, error, info, warn};

use openlease_engine::LeaseEngine;
use openlease_state::{Cache, Hash, KvRead, MerkleStore, Snapshot, State};
use openlease_types::{
    Account, Address, MarketEvent, NodeConfig, OpenleaseError, RejectCode, Result, SignedTx,
    TxResponse,
};

use crate::query::{self, QueryResponse};
use crate::{TxContext, handlers};

/// Outcome of [`LedgerApp::commit`].
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub hash: Hash,
    pub version: u64,
    /// Producer announced by `begin_block` for the committed block.
    pub producer: Option<Address>,
    /// The finalized state, for the facilitator driver.
    pub snapshot: Snapshot,
}

pub struct LedgerApp {
    block: Cache<MerkleStore>,
    config: NodeConfig,
    producer: Option<Address>,
}

impl LedgerApp {
    pub fn new(config: NodeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            block: Cache::new(MerkleStore::from_config(&config.store)),
            config,
            producer: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Version of the last committed block.
    #[must_use]
    pub fn height(&self) -> u64 {
        self.block.version()
    }

    #[must_use]
    pub fn root_hash(&self) -> Hash {
        self.block.backing().root_hash()
    }

    #[must_use]
    pub fn last_snapshot(&self) -> Snapshot {
        self.block.backing().snapshot()
    }

    #[must_use]
    pub fn producer(&self) -> Option<Address> {
        self.producer
    }

    /// Direct access to the in-progress block, bypassing the pipeline.
    /// Genesis loading and the entity kinds this pipeline does not handle
    /// (accounts, providers, deployments, bids) write through here.
    pub fn block_state(&mut self) -> State<&mut Cache<MerkleStore>> {
        State::new(&mut self.block)
    }

    // -----------------------------------------------------------------------
    // Transactions
    // -----------------------------------------------------------------------

    /// Validate without writing anything.
    pub fn check_tx(&self, bytes: &[u8]) -> TxResponse {
        match self.try_check(bytes) {
            Ok(()) => TxResponse::ok(Vec::new()),
            Err(err) => {
                debug!(error = %err, "check_tx rejected");
                err.into()
            }
        }
    }

    /// Validate and apply into the current block.
    pub fn deliver_tx(&mut self, bytes: &[u8]) -> TxResponse {
        match self.try_deliver(bytes) {
            Ok(events) => TxResponse::ok(events),
            Err(err) if err.is_rejection() => {
                warn!(height = self.height(), error = %err, "deliver_tx rejected");
                err.into()
            }
            Err(err) => {
                error!(height = self.height(), error = %err, "deliver_tx failed");
                err.into()
            }
        }
    }

    fn try_check(&self, bytes: &[u8]) -> Result<()> {
        let tx = SignedTx::from_bytes(bytes)?;
        tx.verify()?;
        let ctx = TxContext::new(tx.signer(), self.height());

        let mut branch = State::new(Cache::new(&self.block));
        signer_account(&mut branch, ctx.signer, tx.nonce)?;
        handlers::check(&ctx, &mut branch, &tx.payload)
    }

    fn try_deliver(&mut self, bytes: &[u8]) -> Result<Vec<MarketEvent>> {
        let tx = SignedTx::from_bytes(bytes)?;
        tx.verify()?;
        let ctx = TxContext::new(tx.signer(), self.height());

        {
            let mut block = State::new(&mut self.block);
            let mut account = signer_account(&mut block, ctx.signer, tx.nonce)?;
            account.nonce = tx.nonce;
            block.accounts().save(&account)?;
        }

        let mut branch = State::new(Cache::new(&mut self.block));
        let events = handlers::deliver(&ctx, &mut branch, &tx.payload)?;
        branch.into_inner().write()?;

        debug!(
            kind = tx.payload.kind(),
            signer = %ctx.signer.short(),
            nonce = tx.nonce,
            events = events.len(),
            "tx delivered"
        );
        Ok(events)
    }

    // -----------------------------------------------------------------------
    // Block lifecycle
    // -----------------------------------------------------------------------

    pub fn begin_block(&mut self, producer: Address) {
        debug!(height = self.height(), producer = %producer.short(), "begin block");
        self.producer = Some(producer);
    }

    /// Lease billing. Closing deployments mutates committed state directly,
    /// so it only ever happens here.
    pub fn end_block(&mut self) -> Result<Vec<MarketEvent>> {
        let events = LeaseEngine.run(&mut State::new(&mut self.block))?;
        if !events.is_empty() {
            info!(height = self.height(), closed = events.len(), "leases closed");
        }
        Ok(events)
    }

    /// Flush the block in sorted key order and commit a new version.
    pub fn commit(&mut self) -> Result<CommitInfo> {
        let writes = self.block.pending();
        self.block.write()?;
        let store = self.block.backing_mut();
        let (hash, version) = store.commit();
        let snapshot = store.snapshot();
        let producer = self.producer.take();

        info!(
            version,
            writes,
            hash = %hex::encode(&hash[..4]),
            "block committed"
        );
        Ok(CommitInfo {
            hash,
            version,
            producer,
            snapshot,
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Answer `path` from the last committed snapshot.
    pub fn query(&self, path: &str) -> Result<QueryResponse> {
        query::run(
            &self.last_snapshot(),
            path,
            self.config.market.max_range_limit,
        )
    }
}

impl std::fmt::Debug for LedgerApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerApp")
            .field("height", &self.height())
            .field("pending", &self.block.pending())
            .field("producer", &self.producer)
            .finish_non_exhaustive()
    }
}

/// The signer's account, created empty if absent, after the nonce rule:
/// `nonce` must be strictly greater than the stored one.
fn signer_account<D: KvRead>(state: &mut State<D>, signer: Address, nonce: u64) -> Result<Account> {
    let account = state
        .accounts()
        .get(&signer)?
        .unwrap_or_else(|| Account::new(signer));
    if account.nonce >= nonce {
        return Err(OpenleaseError::Rejected {
            code: RejectCode::InvalidNonce,
            reason: format!("nonce {nonce} not above {}", account.nonce),
        });
    }
    Ok(account)
}

