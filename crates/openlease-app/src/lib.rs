//! # openlease-app
//!
//! **Transition plane**: the single-threaded, totally ordered pipeline every
//! validating node replays block by block.
//!
//! ## Block lifecycle
//!
//! ```text
//! begin_block(producer)
//!   → deliver_tx(bytes)*   decode → verify → nonce → handler (branch cache)
//!   → end_block()          lease billing, direct mutation
//!   → commit()             sorted flush → MerkleStore::commit → Snapshot
//! ```
//!
//! `check_tx` runs the same validation on a throwaway branch and never
//! writes. `query` reads the last committed snapshot and attaches a range
//! proof to every answer.
//!
//! Each transaction kind has exactly one [`TxHandler`]; dispatch is a
//! `match` on [`TxPayload`](openlease_types::TxPayload).

pub mod app;
pub mod context;
pub mod handlers;
pub mod query;

pub use app::{CommitInfo, LedgerApp};
pub use context::TxContext;
pub use handlers::{CloseDeploymentHandler, CreateLeaseHandler, CreateOrderHandler, TxHandler};
pub use query::QueryResponse;
