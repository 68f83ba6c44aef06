//! # openlease-engine
//!
//! **Matching plane**: decides, from ledger state alone, which orders to
//! open, which bids win leases, and which deployments to close.
//!
//! ## Sub-engines
//!
//! - [`DeploymentEngine`]: order creation for OPEN groups whose previous
//!   order expired, and cheapest-bid matching of expired OPEN orders
//! - [`LeaseEngine`]: closes a deployment once its tenant's balance is zero
//!
//! ## Determinism
//!
//! Every scan is in key order and ties go to the first bid encountered, so
//! all nodes planning over the same state reach the same decisions.
//! [`mutations`] holds the state changes shared with the transaction
//! handlers.

pub mod action;
pub mod deployment;
pub mod engine;
pub mod lease;
pub mod matching;
pub mod mutations;

pub use action::MarketAction;
pub use deployment::DeploymentEngine;
pub use engine::{EngineOutput, MarketEngine};
pub use lease::LeaseEngine;
pub use matching::best_fulfillment;
