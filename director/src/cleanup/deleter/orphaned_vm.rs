use std::sync::Arc;
use std::time::Duration;

use sea_orm::entity::prelude::*;
use sea_orm::DatabaseConnection;

use super::wrap_error;
use crate::cloud::{bounded, tolerate_not_found, Cloud};
use crate::database::entity::orphaned_vm::{Entity as OrphanedVm, OrphanedVmModel};
use crate::error::{DirectorError, DirectorResult};
use crate::lock::{orphaned_vm_lock_name, ResourceLocks};

/// Disposes of orphaned VMs.
#[derive(Debug)]
pub struct OrphanedVmDeleter {
    database: DatabaseConnection,
    cloud: Arc<dyn Cloud>,
    locks: Arc<dyn ResourceLocks>,

    /// Bounds both the lock acquisition and the infrastructure call.
    timeout: Duration,
}

impl OrphanedVmDeleter {
    pub fn new(
        database: DatabaseConnection,
        cloud: Arc<dyn Cloud>,
        locks: Arc<dyn ResourceLocks>,
        timeout: Duration,
    ) -> Self {
        Self {
            database,
            cloud,
            locks,
            timeout,
        }
    }

    pub async fn delete(&self, orphaned_vm: &OrphanedVmModel) -> DirectorResult<()> {
        wrap_error(self.delete_inner(orphaned_vm).await, || {
            format!("orphaned vm {}", orphaned_vm.cid)
        })
    }

    async fn delete_inner(&self, orphaned_vm: &OrphanedVmModel) -> DirectorResult<()> {
        let _guard = self
            .locks
            .acquire(&orphaned_vm_lock_name(&orphaned_vm.cid), self.timeout)
            .await?;

        tolerate_not_found(bounded(self.timeout, self.cloud.delete_vm(&orphaned_vm.cid)).await)?;

        OrphanedVm::delete_by_id(orphaned_vm.id)
            .exec(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        tracing::info!("Deleted orphaned vm {}", orphaned_vm.cid);

        Ok(())
    }
}
