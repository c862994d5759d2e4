use std::sync::Arc;

use sea_orm::entity::prelude::*;
use sea_orm::DatabaseConnection;

use super::wrap_error;
use crate::database::entity::template::{Entity as Template, TemplateModel};
use crate::error::{DirectorError, DirectorResult};
use crate::storage::StorageBackend;

/// Deletes job templates.
#[derive(Debug)]
pub struct TemplateDeleter {
    database: DatabaseConnection,
    storage: Arc<dyn StorageBackend>,
}

impl TemplateDeleter {
    pub fn new(database: DatabaseConnection, storage: Arc<dyn StorageBackend>) -> Self {
        Self { database, storage }
    }

    pub async fn delete(&self, template: &TemplateModel) -> DirectorResult<()> {
        wrap_error(self.delete_inner(template).await, || {
            format!("template {}/{}", template.name, template.version)
        })
    }

    async fn delete_inner(&self, template: &TemplateModel) -> DirectorResult<()> {
        if let Some(blobstore_id) = &template.blobstore_id {
            self.storage.delete_file(blobstore_id.clone()).await?;
        }

        Template::delete_by_id(template.id)
            .exec(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        Ok(())
    }
}
