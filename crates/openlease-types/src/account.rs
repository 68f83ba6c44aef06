//! Accounts and providers.

use serde::{Deserialize, Serialize};

use crate::Address;

/// A ledger account. Mutated by transfers, lease billing and by the nonce
/// rule of the transaction pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,
    pub balance: u64,
    /// Highest nonce this account has signed with.
    pub nonce: u64,
}

impl Account {
    /// A fresh account with zero balance and nonce.
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            balance: 0,
            nonce: 0,
        }
    }

    #[must_use]
    pub fn with_balance(mut self, balance: u64) -> Self {
        self.balance = balance;
        self
    }
}

/// A `name = value` capability advertised by a provider or required by a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderAttribute {
    pub name: String,
    pub value: String,
}

impl ProviderAttribute {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A registered compute provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub address: Address,
    /// Account that receives lease payments.
    pub owner: Address,
    /// Network address the provider serves from.
    pub host_uri: String,
    pub attributes: Vec<ProviderAttribute>,
}

impl Provider {
    /// Whether this provider advertises every attribute in `requirements`.
    #[must_use]
    pub fn satisfies(&self, requirements: &[ProviderAttribute]) -> bool {
        requirements.iter().all(|req| self.attributes.contains(req))
    }
}
