use std::sync::Arc;

use sea_orm::entity::prelude::*;
use sea_orm::DatabaseConnection;

use super::wrap_error;
use crate::database::entity::blob::{BlobModel, Entity as Blob};
use crate::database::entity::local_dns_blob::{self, Entity as LocalDnsBlob};
use crate::error::{DirectorError, DirectorResult};
use crate::storage::StorageBackend;

/// Deletes exported releases and DNS blobs.
#[derive(Debug)]
pub struct BlobDeleter {
    database: DatabaseConnection,
    storage: Arc<dyn StorageBackend>,
}

impl BlobDeleter {
    pub fn new(database: DatabaseConnection, storage: Arc<dyn StorageBackend>) -> Self {
        Self { database, storage }
    }

    /// Deletes the content of a blob, then its rows.
    ///
    /// If the content cannot be deleted, the rows stay so that the
    /// next pass can retry.
    pub async fn delete(&self, blob: &BlobModel) -> DirectorResult<()> {
        wrap_error(self.delete_inner(blob).await, || {
            format!("{} blob {}", blob.blob_type, blob.blobstore_id)
        })
    }

    async fn delete_inner(&self, blob: &BlobModel) -> DirectorResult<()> {
        self.storage.delete_file(blob.blobstore_id.clone()).await?;

        LocalDnsBlob::delete_many()
            .filter(local_dns_blob::Column::BlobId.eq(blob.id))
            .exec(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        Blob::delete_by_id(blob.id)
            .exec(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        tracing::debug!("Deleted {} blob {}", blob.blob_type, blob.blobstore_id);

        Ok(())
    }
}
