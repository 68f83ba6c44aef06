//! # openlease-state
//!
//! **State plane**: the versioned, authenticated key/value store the ledger
//! runs on, and the typed adapters the engine and transaction handlers use.
//!
//! ## Layers
//!
//! ```text
//!   State<D> ── adapters (Account, Deployment, Group, Provider,
//!      │                  Order, Fulfillment, Lease) + Sequence
//!      ▼
//!   Cache<B>  ── per-block / per-tx write buffer, sorted flush
//!      ▼
//!   MerkleStore ── working set + committed Snapshots (Merkle root,
//!                  range proofs, bounded history)
//! ```
//!
//! Missing keys are `Ok(None)`; decode and backing failures are errors that
//! abort the current transition step.

pub mod adapter;
pub mod cache;
pub mod keys;
pub mod merkle;
pub mod merkle_store;
pub mod sequence;
pub mod state;
pub mod store;

pub use adapter::{
    AccountAdapter, Adapter, DeploymentAdapter, FulfillmentAdapter, GroupAdapter, LeaseAdapter,
    OrderAdapter, ProvenRange, ProvenRead, ProviderAdapter,
};
pub use cache::Cache;
pub use keys::Keyed;
pub use merkle::{Hash, LeafProof, MerkleTree, RangeProof, empty_root, value_hash};
pub use merkle_store::{MerkleStore, Snapshot};
pub use sequence::Sequence;
pub use state::State;
pub use store::{KvPair, KvRead, KvStore, ProvableRead};
