//! # openlease-facilitator
//!
//! **Proposal plane**: runs the matching engine once per block on the node
//! that produced it, and feeds the resulting transactions back into the
//! ordinary validate/apply pipeline.
//!
//! ## Components
//!
//! ```text
//!   consensus ── BlockNotification ──▶ Driver      leader check, once per commit
//!                                        │
//!                                        ▼
//!                                      Worker      single slot, sheds load
//!                                        │
//!                                        ▼
//!                                      Facilitator engine.propose(snapshot)
//!                                        │
//!                                        ▼
//!                                      Sender ──▶ Signer ──▶ BroadcastClient
//! ```
//!
//! Nothing here mutates ledger state. The only shared mutable data are the
//! Driver's pending announcement and the Sender's in-memory nonce.

pub mod broadcast;
pub mod driver;
pub mod facilitator;
pub mod sender;
pub mod signer;
pub mod worker;

pub use broadcast::{BroadcastClient, ChannelBroadcaster};
pub use driver::{BlockAnnouncement, BlockNotification, Driver};
pub use facilitator::{Facilitator, RunReport, StateRunner};
pub use sender::Sender;
pub use signer::{Ed25519Signer, Signer};
pub use worker::Worker;
