//! Deployments and their groups.

use serde::{Deserialize, Serialize};

use crate::{Address, GroupId, ProviderAttribute};

/// Lifecycle of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeploymentState {
    Active,
    Closed,
}

impl std::fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// A tenant's requested workload, composed of one or more groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub address: Address,
    pub tenant: Address,
    pub state: DeploymentState,
}

impl Deployment {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == DeploymentState::Active
    }
}

/// Lifecycle of a deployment group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupState {
    Open,
    Ordered,
    Matched,
    InsufficientFunds,
    Closed,
}

impl std::fmt::Display for GroupState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Ordered => write!(f, "ORDERED"),
            Self::Matched => write!(f, "MATCHED"),
            Self::InsufficientFunds => write!(f, "INSUFFICIENT_FUNDS"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// Compute shape of one unit of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUnit {
    /// Thousandths of a CPU.
    pub cpu: u32,
    /// Bytes.
    pub memory: u64,
    /// Bytes.
    pub disk: u64,
}

/// `count` units of `unit`, at most `price` per unit per block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroup {
    pub unit: ResourceUnit,
    pub count: u32,
    pub price: u64,
}

/// A sub-unit of a deployment with its own resource requirements and lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub state: GroupState,
    pub requirements: Vec<ProviderAttribute>,
    pub resources: Vec<ResourceGroup>,
    /// Blocks an order for this group stays open before it can be matched.
    pub order_ttl: u64,
}

impl Group {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == GroupState::Open
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Deployment {
    pub fn dummy(address: Address, tenant: Address) -> Self {
        Self {
            address,
            tenant,
            state: DeploymentState::Active,
        }
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Group {
    pub fn dummy(deployment: Address, seq: u64, order_ttl: u64) -> Self {
        Self {
            id: GroupId::new(deployment, seq),
            state: GroupState::Open,
            requirements: Vec::new(),
            resources: vec![ResourceGroup {
                unit: ResourceUnit {
                    cpu: 500,
                    memory: 512 * 1024 * 1024,
                    disk: 1024 * 1024 * 1024,
                },
                count: 1,
                price: 100,
            }],
            order_ttl,
        }
    }
}
