use std::sync::Arc;
use std::time::Duration;

use sea_orm::entity::prelude::*;
use sea_orm::DatabaseConnection;

use super::wrap_error;
use crate::cloud::{bounded, tolerate_not_found, Cloud};
use crate::database::entity::orphan_disk::{Entity as OrphanDisk, OrphanDiskModel};
use crate::database::entity::orphan_snapshot::{self, Entity as OrphanSnapshot};
use crate::error::{DirectorError, DirectorResult};

/// Deletes orphaned disks and their snapshots.
#[derive(Debug)]
pub struct OrphanDiskManager {
    database: DatabaseConnection,
    cloud: Arc<dyn Cloud>,
    timeout: Duration,
}

impl OrphanDiskManager {
    pub fn new(database: DatabaseConnection, cloud: Arc<dyn Cloud>, timeout: Duration) -> Self {
        Self {
            database,
            cloud,
            timeout,
        }
    }

    pub async fn delete_orphan_disk(&self, orphan_disk: &OrphanDiskModel) -> DirectorResult<()> {
        wrap_error(self.delete_inner(orphan_disk).await, || {
            format!("orphaned disk {}", orphan_disk.disk_cid)
        })
    }

    async fn delete_inner(&self, orphan_disk: &OrphanDiskModel) -> DirectorResult<()> {
        let snapshots = OrphanSnapshot::find()
            .filter(orphan_snapshot::Column::OrphanDiskId.eq(orphan_disk.id))
            .all(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        for snapshot in &snapshots {
            let call = self.cloud.delete_snapshot(&snapshot.snapshot_cid);
            tolerate_not_found(bounded(self.timeout, call).await)?;

            OrphanSnapshot::delete_by_id(snapshot.id)
                .exec(&self.database)
                .await
                .map_err(DirectorError::database_error)?;
        }

        let call = self.cloud.delete_disk(&orphan_disk.disk_cid);
        tolerate_not_found(bounded(self.timeout, call).await)?;

        OrphanDisk::delete_by_id(orphan_disk.id)
            .exec(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        tracing::info!("Deleted orphaned disk {}", orphan_disk.disk_cid);

        Ok(())
    }
}
