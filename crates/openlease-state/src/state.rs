//! The `State` handle: a store plus typed adapters.

use openlease_types::{Account, Deployment, Fulfillment, Group, Lease, Order, Provider};

use crate::adapter::Adapter;
use crate::{KvRead, Keyed};

/// Typed view over a store `D`.
///
/// `D` is the in-progress block [`Cache`](crate::Cache) inside the
/// transition pipeline, a per-transaction branch of it, or a committed
/// [`Snapshot`](crate::Snapshot) for the facilitator and queries.
#[derive(Debug)]
pub struct State<D> {
    db: D,
}

impl<D> State<D> {
    pub fn new(db: D) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &D {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut D {
        &mut self.db
    }

    pub fn into_inner(self) -> D {
        self.db
    }

    /// Adapter for any entity kind; the named accessors below are shorthands.
    pub fn adapter<T: Keyed>(&mut self) -> Adapter<'_, T, D> {
        Adapter::new(&mut self.db)
    }

    pub fn accounts(&mut self) -> Adapter<'_, Account, D> {
        Adapter::new(&mut self.db)
    }

    pub fn deployments(&mut self) -> Adapter<'_, Deployment, D> {
        Adapter::new(&mut self.db)
    }

    pub fn groups(&mut self) -> Adapter<'_, Group, D> {
        Adapter::new(&mut self.db)
    }

    pub fn providers(&mut self) -> Adapter<'_, Provider, D> {
        Adapter::new(&mut self.db)
    }

    pub fn orders(&mut self) -> Adapter<'_, Order, D> {
        Adapter::new(&mut self.db)
    }

    pub fn fulfillments(&mut self) -> Adapter<'_, Fulfillment, D> {
        Adapter::new(&mut self.db)
    }

    pub fn leases(&mut self) -> Adapter<'_, Lease, D> {
        Adapter::new(&mut self.db)
    }
}

impl<D: KvRead> State<D> {
    /// Height of the last committed block this state builds on.
    pub fn version(&self) -> u64 {
        self.db.version()
    }
}
