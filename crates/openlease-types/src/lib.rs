//! # openlease-types
//!
//! Shared types, errors, and configuration for the **OpenLease** compute
//! marketplace settlement layer.
//!
//! This crate is the leaf dependency of the workspace: every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`GroupId`], [`OrderId`], [`FulfillmentId`], [`LeaseId`]
//! - **Ledger model**: [`Account`], [`Provider`], [`Deployment`], [`Group`]
//! - **Market model**: [`Order`], [`Fulfillment`], [`Lease`]
//! - **Transactions**: [`TxPayload`], [`SignedTx`], [`TxResponse`]
//! - **Events**: [`MarketEvent`]
//! - **Configuration**: [`NodeConfig`], [`StoreConfig`], [`MarketConfig`], [`FacilitatorConfig`]
//! - **Errors**: [`OpenleaseError`] with `OL_ERR_` prefix codes
//! - **Constants**: key prefixes, limits and defaults

pub mod account;
pub mod address;
pub mod config;
pub mod constants;
pub mod deployment;
pub mod error;
pub mod event;
pub mod ids;
pub mod market;
pub mod tx;

// Re-export all primary types at crate root for ergonomic imports:
//   use openlease_types::{Order, OrderState, Lease, TxPayload, ...};

pub use account::*;
pub use address::*;
pub use config::*;
pub use deployment::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use market::*;
pub use tx::*;

// Constants are accessed via `openlease_types::constants::FOO`
// (not re-exported to avoid name collisions).
