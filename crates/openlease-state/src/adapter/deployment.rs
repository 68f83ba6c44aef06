use openlease_types::{Address, CompositeId, Deployment, Group, Result, constants};

use super::Adapter;
use crate::keys;
use crate::{KvRead, Sequence};

impl<D> Adapter<'_, Deployment, D> {
    /// Order sequence counter owned by `deployment`.
    pub fn sequence_for(&mut self, deployment: Address) -> Sequence<'_, D> {
        let mut key = constants::DEPLOYMENT_SEQUENCE_PREFIX.to_vec();
        deployment.write_bytes(&mut key);
        Sequence::new(&mut *self.db, key)
    }
}

impl<D: KvRead> Adapter<'_, Deployment, D> {
    /// ACTIVE deployments in key order.
    pub fn active(&self) -> Result<Vec<Deployment>> {
        Ok(self.all()?.into_iter().filter(Deployment::is_active).collect())
    }
}

impl<D: KvRead> Adapter<'_, Group, D> {
    pub fn for_deployment(&self, deployment: Address) -> Result<Vec<Group>> {
        let (first, last) = keys::groups_of(deployment);
        self.between(&first, &last)
    }
}
