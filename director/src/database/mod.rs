pub mod entity;
pub mod migration;

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::DatabaseConnection;

use crate::error::{DirectorError, DirectorResult};
use entity::deployment::Entity as Deployment;
use entity::deployments_release_versions::{self, Entity as DeploymentsReleaseVersions};
use entity::deployments_stemcells::{self, Entity as DeploymentsStemcells};
use entity::release::{self, Entity as Release, ReleaseModel};
use entity::release_version::{self, Entity as ReleaseVersion, ReleaseVersionModel};
use entity::stemcell::{self, Entity as Stemcell, StemcellModel};

/// Catalog lookups shared by the pickers and the deleters.
#[async_trait]
pub trait DirectorDatabase: Send + Sync {
    /// Retrieves a release by name.
    async fn find_release(&self, name: &str) -> DirectorResult<Option<ReleaseModel>>;

    /// Retrieves a version of a release.
    async fn find_release_version(
        &self,
        release_id: i64,
        version: &str,
    ) -> DirectorResult<Option<ReleaseVersionModel>>;

    /// Returns the number of versions a release has left.
    async fn count_release_versions(&self, release_id: i64) -> DirectorResult<u64>;

    /// Returns whether any deployment uses a release version.
    async fn is_release_version_in_use(&self, release_version_id: i64) -> DirectorResult<bool>;

    /// Retrieves every stemcell row with a name and version.
    async fn find_stemcells(&self, name: &str, version: &str) -> DirectorResult<Vec<StemcellModel>>;

    /// Returns whether any deployment uses a stemcell.
    async fn is_stemcell_in_use(&self, stemcell_id: i64) -> DirectorResult<bool>;

    /// Returns the number of deployments.
    async fn count_deployments(&self) -> DirectorResult<u64>;
}

#[async_trait]
impl DirectorDatabase for DatabaseConnection {
    async fn find_release(&self, name: &str) -> DirectorResult<Option<ReleaseModel>> {
        Release::find()
            .filter(release::Column::Name.eq(name))
            .one(self)
            .await
            .map_err(DirectorError::database_error)
    }

    async fn find_release_version(
        &self,
        release_id: i64,
        version: &str,
    ) -> DirectorResult<Option<ReleaseVersionModel>> {
        ReleaseVersion::find()
            .filter(release_version::Column::ReleaseId.eq(release_id))
            .filter(release_version::Column::Version.eq(version))
            .one(self)
            .await
            .map_err(DirectorError::database_error)
    }

    async fn count_release_versions(&self, release_id: i64) -> DirectorResult<u64> {
        ReleaseVersion::find()
            .filter(release_version::Column::ReleaseId.eq(release_id))
            .count(self)
            .await
            .map_err(DirectorError::database_error)
    }

    async fn is_release_version_in_use(&self, release_version_id: i64) -> DirectorResult<bool> {
        let users = DeploymentsReleaseVersions::find()
            .filter(deployments_release_versions::Column::ReleaseVersionId.eq(release_version_id))
            .count(self)
            .await
            .map_err(DirectorError::database_error)?;

        Ok(users > 0)
    }

    async fn find_stemcells(&self, name: &str, version: &str) -> DirectorResult<Vec<StemcellModel>> {
        Stemcell::find()
            .filter(stemcell::Column::Name.eq(name))
            .filter(stemcell::Column::Version.eq(version))
            .all(self)
            .await
            .map_err(DirectorError::database_error)
    }

    async fn is_stemcell_in_use(&self, stemcell_id: i64) -> DirectorResult<bool> {
        let users = DeploymentsStemcells::find()
            .filter(deployments_stemcells::Column::StemcellId.eq(stemcell_id))
            .count(self)
            .await
            .map_err(DirectorError::database_error)?;

        Ok(users > 0)
    }

    async fn count_deployments(&self) -> DirectorResult<u64> {
        Deployment::find()
            .count(self)
            .await
            .map_err(DirectorError::database_error)
    }
}
