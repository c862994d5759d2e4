use std::sync::Arc;

use sea_orm::entity::prelude::*;
use sea_orm::DatabaseConnection;

use super::wrap_error;
use crate::database::entity::compiled_package::{CompiledPackageModel, Entity as CompiledPackage};
use crate::error::{DirectorError, DirectorResult};
use crate::storage::StorageBackend;

/// Deletes compiled packages.
#[derive(Debug)]
pub struct CompiledPackageDeleter {
    database: DatabaseConnection,
    storage: Arc<dyn StorageBackend>,
}

impl CompiledPackageDeleter {
    pub fn new(database: DatabaseConnection, storage: Arc<dyn StorageBackend>) -> Self {
        Self { database, storage }
    }

    /// Deletes a compiled package and its tarball.
    ///
    /// If the source package is already gone, so is the tarball, and
    /// only the row is removed.
    pub async fn delete(&self, compiled_package: &CompiledPackageModel) -> DirectorResult<()> {
        wrap_error(self.delete_inner(compiled_package).await, || {
            format!(
                "compiled package {} for {}/{}",
                compiled_package.id,
                compiled_package.stemcell_os,
                compiled_package.stemcell_version
            )
        })
    }

    async fn delete_inner(&self, compiled_package: &CompiledPackageModel) -> DirectorResult<()> {
        // The row we were handed may be stale
        let current = CompiledPackage::find_by_id(compiled_package.id)
            .one(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        let current = match current {
            Some(current) => current,
            None => {
                tracing::debug!("Compiled package {} is already gone", compiled_package.id);
                return Ok(());
            }
        };

        if current.package_id.is_some() {
            self.storage
                .delete_file(current.blobstore_id.clone())
                .await?;
        } else {
            tracing::debug!(
                "Package of compiled package {} is already gone, not deleting {}",
                current.id,
                current.blobstore_id
            );
        }

        CompiledPackage::delete_by_id(current.id)
            .exec(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        Ok(())
    }
}
