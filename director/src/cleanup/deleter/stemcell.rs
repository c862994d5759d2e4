use std::sync::Arc;
use std::time::Duration;

use sea_orm::entity::prelude::*;
use sea_orm::DatabaseConnection;

use dockyard::api::v1::cleanup::StemcellCandidate;

use super::wrap_error;
use crate::cloud::{bounded, tolerate_not_found, Cloud};
use crate::database::entity::stemcell::{Entity as Stemcell, StemcellModel};
use crate::database::entity::stemcell_upload::{self, Entity as StemcellUpload};
use crate::database::DirectorDatabase;
use crate::error::{DirectorError, DirectorResult};

/// Deletes stemcells.
#[derive(Debug)]
pub struct StemcellDeleter {
    database: DatabaseConnection,
    cloud: Arc<dyn Cloud>,

    /// Bounds deleting the stemcell image.
    timeout: Duration,
}

impl StemcellDeleter {
    pub fn new(database: DatabaseConnection, cloud: Arc<dyn Cloud>, timeout: Duration) -> Self {
        Self {
            database,
            cloud,
            timeout,
        }
    }

    /// Deletes every copy of a stemcell.
    ///
    /// The upload records go first, then each stemcell row together
    /// with its image in the infrastructure.
    pub async fn delete(&self, candidate: &StemcellCandidate) -> DirectorResult<()> {
        wrap_error(self.delete_inner(candidate).await, || {
            format!("stemcell {}/{}", candidate.name, candidate.version)
        })
    }

    async fn delete_inner(&self, candidate: &StemcellCandidate) -> DirectorResult<()> {
        StemcellUpload::delete_many()
            .filter(stemcell_upload::Column::Name.eq(candidate.name.as_str()))
            .filter(stemcell_upload::Column::Version.eq(candidate.version.as_str()))
            .exec(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        let stemcells = self
            .database
            .find_stemcells(&candidate.name, &candidate.version)
            .await?;

        for stemcell in &stemcells {
            self.delete_one(stemcell).await?;
        }

        Ok(())
    }

    async fn delete_one(&self, stemcell: &StemcellModel) -> DirectorResult<()> {
        if self.database.is_stemcell_in_use(stemcell.id).await? {
            return Err(DirectorError::StemcellInUse {
                name: stemcell.name.clone(),
                version: stemcell.version.clone(),
            });
        }

        tolerate_not_found(bounded(self.timeout, self.cloud.delete_stemcell(&stemcell.cid)).await)?;

        Stemcell::delete_by_id(stemcell.id)
            .exec(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        tracing::info!(
            "Deleted stemcell {}/{} ({})",
            stemcell.name,
            stemcell.version,
            stemcell.cid
        );

        Ok(())
    }
}
