use std::sync::Arc;

use sea_orm::entity::prelude::*;
use sea_orm::DatabaseConnection;

use super::{wrap_error, PackageDeleter, TemplateDeleter};
use crate::database::entity::package::{self, Entity as Package};
use crate::database::entity::packages_release_versions::{self, Entity as PackagesReleaseVersions};
use crate::database::entity::release::{Entity as Release, ReleaseModel};
use crate::database::entity::release_version::{
    self, Entity as ReleaseVersion, ReleaseVersionModel,
};
use crate::database::entity::template::{self, Entity as Template};
use crate::database::entity::templates_release_versions::{
    self, Entity as TemplatesReleaseVersions,
};
use crate::database::DirectorDatabase;
use crate::error::{DirectorError, DirectorResult};

/// Deletes whole releases.
#[derive(Debug)]
pub struct ReleaseDeleter {
    database: DatabaseConnection,
    package_deleter: Arc<PackageDeleter>,
    template_deleter: Arc<TemplateDeleter>,
}

/// Deletes single versions of a release.
#[derive(Debug)]
pub struct ReleaseVersionDeleter {
    database: DatabaseConnection,
    release_deleter: Arc<ReleaseDeleter>,
    package_deleter: Arc<PackageDeleter>,
    template_deleter: Arc<TemplateDeleter>,
}

/// Deletes release versions by name and version.
#[derive(Debug)]
pub struct NameVersionReleaseDeleter {
    database: DatabaseConnection,
    release_version_deleter: ReleaseVersionDeleter,
}

impl ReleaseDeleter {
    pub fn new(
        database: DatabaseConnection,
        package_deleter: Arc<PackageDeleter>,
        template_deleter: Arc<TemplateDeleter>,
    ) -> Self {
        Self {
            database,
            package_deleter,
            template_deleter,
        }
    }

    /// Deletes a release with everything it contains.
    pub async fn delete(&self, release: &ReleaseModel) -> DirectorResult<()> {
        wrap_error(self.delete_inner(release).await, || {
            format!("release {}", release.name)
        })
    }

    /// Deletes a release if it has no versions left.
    ///
    /// Returns whether the release was deleted.
    pub async fn delete_if_empty(&self, release: &ReleaseModel) -> DirectorResult<bool> {
        let versions = self.database.count_release_versions(release.id).await?;
        if versions > 0 {
            return Ok(false);
        }

        self.delete(release).await?;
        Ok(true)
    }

    async fn delete_inner(&self, release: &ReleaseModel) -> DirectorResult<()> {
        let packages = Package::find()
            .filter(package::Column::ReleaseId.eq(release.id))
            .all(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        for package in &packages {
            self.package_deleter.delete(package).await?;
        }

        let templates = Template::find()
            .filter(template::Column::ReleaseId.eq(release.id))
            .all(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        for template in &templates {
            self.template_deleter.delete(template).await?;
        }

        ReleaseVersion::delete_many()
            .filter(release_version::Column::ReleaseId.eq(release.id))
            .exec(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        Release::delete_by_id(release.id)
            .exec(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        tracing::info!("Deleted release {}", release.name);

        Ok(())
    }
}

impl ReleaseVersionDeleter {
    pub fn new(
        database: DatabaseConnection,
        release_deleter: Arc<ReleaseDeleter>,
        package_deleter: Arc<PackageDeleter>,
        template_deleter: Arc<TemplateDeleter>,
    ) -> Self {
        Self {
            database,
            release_deleter,
            package_deleter,
            template_deleter,
        }
    }

    pub fn release_deleter(&self) -> &ReleaseDeleter {
        &self.release_deleter
    }

    /// Deletes a version of a release.
    ///
    /// Templates and packages not used by any other version of the
    /// release go with it. If the release is left without versions, it
    /// is deleted as well.
    pub async fn delete(
        &self,
        release: &ReleaseModel,
        release_version: &ReleaseVersionModel,
    ) -> DirectorResult<()> {
        wrap_error(self.delete_inner(release, release_version).await, || {
            format!("release {}/{}", release.name, release_version.version)
        })
    }

    async fn delete_inner(
        &self,
        release: &ReleaseModel,
        release_version: &ReleaseVersionModel,
    ) -> DirectorResult<()> {
        if self
            .database
            .is_release_version_in_use(release_version.id)
            .await?
        {
            return Err(DirectorError::ReleaseVersionInUse {
                name: release.name.clone(),
                version: release_version.version.clone(),
            });
        }

        self.delete_exclusive_templates(release_version).await?;
        self.delete_exclusive_packages(release_version).await?;

        TemplatesReleaseVersions::delete_many()
            .filter(templates_release_versions::Column::ReleaseVersionId.eq(release_version.id))
            .exec(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        PackagesReleaseVersions::delete_many()
            .filter(packages_release_versions::Column::ReleaseVersionId.eq(release_version.id))
            .exec(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        ReleaseVersion::delete_by_id(release_version.id)
            .exec(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        tracing::info!(
            "Deleted release version {}/{}",
            release.name,
            release_version.version
        );

        self.release_deleter.delete_if_empty(release).await?;

        Ok(())
    }

    async fn delete_exclusive_templates(
        &self,
        release_version: &ReleaseVersionModel,
    ) -> DirectorResult<()> {
        let links = TemplatesReleaseVersions::find()
            .filter(templates_release_versions::Column::ReleaseVersionId.eq(release_version.id))
            .all(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        for link in links {
            let other_users = TemplatesReleaseVersions::find()
                .filter(templates_release_versions::Column::TemplateId.eq(link.template_id))
                .filter(
                    templates_release_versions::Column::ReleaseVersionId.ne(release_version.id),
                )
                .count(&self.database)
                .await
                .map_err(DirectorError::database_error)?;

            if other_users > 0 {
                continue;
            }

            let template = Template::find_by_id(link.template_id)
                .one(&self.database)
                .await
                .map_err(DirectorError::database_error)?;

            if let Some(template) = template {
                self.template_deleter.delete(&template).await?;
            }
        }

        Ok(())
    }

    async fn delete_exclusive_packages(
        &self,
        release_version: &ReleaseVersionModel,
    ) -> DirectorResult<()> {
        let links = PackagesReleaseVersions::find()
            .filter(packages_release_versions::Column::ReleaseVersionId.eq(release_version.id))
            .all(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        for link in links {
            let other_users = PackagesReleaseVersions::find()
                .filter(packages_release_versions::Column::PackageId.eq(link.package_id))
                .filter(packages_release_versions::Column::ReleaseVersionId.ne(release_version.id))
                .count(&self.database)
                .await
                .map_err(DirectorError::database_error)?;

            if other_users > 0 {
                continue;
            }

            let package = Package::find_by_id(link.package_id)
                .one(&self.database)
                .await
                .map_err(DirectorError::database_error)?;

            if let Some(package) = package {
                self.package_deleter.delete(&package).await?;
            }
        }

        Ok(())
    }
}

impl NameVersionReleaseDeleter {
    pub fn new(database: DatabaseConnection, release_version_deleter: ReleaseVersionDeleter) -> Self {
        Self {
            database,
            release_version_deleter,
        }
    }

    /// Deletes a release version by name.
    ///
    /// A release or version that no longer exists is not an error.
    pub async fn find_and_delete_release(&self, name: &str, version: &str) -> DirectorResult<()> {
        let release = match self.database.find_release(name).await? {
            Some(release) => release,
            None => {
                tracing::debug!("Release {} is already gone", name);
                return Ok(());
            }
        };

        let release_version = match self
            .database
            .find_release_version(release.id, version)
            .await?
        {
            Some(release_version) => release_version,
            None => {
                tracing::debug!("Release version {}/{} is already gone", name, version);
                return Ok(());
            }
        };

        self.release_version_deleter
            .delete(&release, &release_version)
            .await
    }

    /// Deletes a release that has no versions.
    pub async fn find_and_delete_empty_release(&self, name: &str) -> DirectorResult<()> {
        let release = match self.database.find_release(name).await? {
            Some(release) => release,
            None => {
                tracing::debug!("Release {} is already gone", name);
                return Ok(());
            }
        };

        let deleted = self
            .release_version_deleter
            .release_deleter()
            .delete_if_empty(&release)
            .await?;

        if !deleted {
            tracing::debug!("Release {} has versions again, keeping it", name);
        }

        Ok(())
    }
}
