use std::sync::Arc;

use sea_orm::entity::prelude::*;
use sea_orm::DatabaseConnection;

use super::{wrap_error, CompiledPackageDeleter};
use crate::database::entity::compiled_package::{self, Entity as CompiledPackage};
use crate::database::entity::package::{Entity as Package, PackageModel};
use crate::error::{DirectorError, DirectorResult};
use crate::storage::StorageBackend;

/// Deletes packages along with their compiled packages.
#[derive(Debug)]
pub struct PackageDeleter {
    database: DatabaseConnection,
    storage: Arc<dyn StorageBackend>,
    compiled_package_deleter: Arc<CompiledPackageDeleter>,
}

impl PackageDeleter {
    pub fn new(
        database: DatabaseConnection,
        storage: Arc<dyn StorageBackend>,
        compiled_package_deleter: Arc<CompiledPackageDeleter>,
    ) -> Self {
        Self {
            database,
            storage,
            compiled_package_deleter,
        }
    }

    pub async fn delete(&self, package: &PackageModel) -> DirectorResult<()> {
        wrap_error(self.delete_inner(package).await, || {
            format!("package {}/{}", package.name, package.version)
        })
    }

    async fn delete_inner(&self, package: &PackageModel) -> DirectorResult<()> {
        let compiled_packages = CompiledPackage::find()
            .filter(compiled_package::Column::PackageId.eq(package.id))
            .all(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        for compiled_package in &compiled_packages {
            self.compiled_package_deleter.delete(compiled_package).await?;
        }

        if let Some(blobstore_id) = &package.blobstore_id {
            self.storage.delete_file(blobstore_id.clone()).await?;
        }

        Package::delete_by_id(package.id)
            .exec(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        tracing::debug!("Deleted package {}/{}", package.name, package.version);

        Ok(())
    }
}
