//! Retention pickers.
//!
//! Each picker is a read over the catalog at call time. Nothing is
//! reserved, so the deleters check again whether an artifact is in use
//! right before deleting it.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, QueryOrder, QuerySelect};
use tokio::sync::OnceCell;

use dockyard::api::v1::cleanup::{CleanableArtifacts, ReleaseCandidate, StemcellCandidate};
use dockyard::version::Version;

use super::policy::CleanupPolicy;
use crate::database::entity::blob::{self, BlobModel, Entity as Blob};
use crate::database::entity::compiled_package::{
    self, CompiledPackageModel, Entity as CompiledPackage,
};
use crate::database::entity::deployments_release_versions::Entity as DeploymentsReleaseVersions;
use crate::database::entity::deployments_stemcells::Entity as DeploymentsStemcells;
use crate::database::entity::local_dns_blob::{self, Entity as LocalDnsBlob};
use crate::database::entity::orphan_disk::{Entity as OrphanDisk, OrphanDiskModel};
use crate::database::entity::orphaned_vm::{Entity as OrphanedVm, OrphanedVmModel};
use crate::database::entity::package::Entity as Package;
use crate::database::entity::release::Entity as Release;
use crate::database::entity::release_version::Entity as ReleaseVersion;
use crate::database::entity::stemcell::Entity as Stemcell;
use crate::error::{DirectorError, DirectorResult};

/// A compiled package picked for deletion.
#[derive(Debug, Clone)]
pub struct CompiledPackageCandidate {
    pub compiled_package: CompiledPackageModel,

    /// Name of the source package.
    ///
    /// `None` if the source package has already been deleted.
    pub package_name: Option<String>,
}

/// Picks the artifacts a maintenance pass deletes.
#[derive(Debug)]
pub struct ArtifactPicker {
    database: DatabaseConnection,
    policy: CleanupPolicy,

    /// Stemcell candidates, shared with the compiled package picker.
    stemcells: OnceCell<Vec<StemcellCandidate>>,
}

impl CompiledPackageCandidate {
    /// Returns whether the source package is gone.
    pub fn is_vacated(&self) -> bool {
        self.compiled_package.package_id.is_none()
    }

    /// Returns a `name for os/version` label.
    pub fn label(&self) -> String {
        format!(
            "{} for {}/{}",
            self.package_name.as_deref().unwrap_or("(deleted package)"),
            self.compiled_package.stemcell_os,
            self.compiled_package.stemcell_version,
        )
    }
}

impl ArtifactPicker {
    pub fn new(database: DatabaseConnection, policy: CleanupPolicy) -> Self {
        Self {
            database,
            policy,
            stemcells: OnceCell::new(),
        }
    }

    /// Picks orphaned VMs.
    ///
    /// Only a full wipe deletes them.
    pub async fn orphaned_vms(&self) -> DirectorResult<Vec<OrphanedVmModel>> {
        if !self.policy.remove_all {
            return Ok(Vec::new());
        }

        OrphanedVm::find()
            .all(&self.database)
            .await
            .map_err(DirectorError::database_error)
    }

    /// Picks release versions.
    ///
    /// For each release, the unused versions are ordered and all but the
    /// newest `releases_to_keep` are picked. Releases without any
    /// version are picked with an empty version list.
    pub async fn releases(&self) -> DirectorResult<Vec<ReleaseCandidate>> {
        let releases = Release::find()
            .find_with_related(ReleaseVersion)
            .all(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        let in_use: HashSet<i64> = DeploymentsReleaseVersions::find()
            .all(&self.database)
            .await
            .map_err(DirectorError::database_error)?
            .into_iter()
            .map(|link| link.release_version_id)
            .collect();

        let mut candidates = Vec::new();

        'releases: for (release, versions) in releases {
            if versions.is_empty() {
                candidates.push(ReleaseCandidate {
                    name: release.name,
                    versions: Vec::new(),
                });
                continue;
            }

            let mut unused = Vec::new();
            for version in versions.iter().filter(|v| !in_use.contains(&v.id)) {
                match Version::parse(&version.version) {
                    Ok(parsed) => unused.push(parsed),
                    Err(e) => {
                        tracing::warn!("Not cleaning up release {}: {}", release.name, e);
                        continue 'releases;
                    }
                }
            }

            unused.sort();

            let excess = unused.len().saturating_sub(self.policy.releases_to_keep);
            if excess == 0 {
                continue;
            }

            candidates.push(ReleaseCandidate {
                name: release.name,
                versions: unused
                    .iter()
                    .take(excess)
                    .map(|v| v.as_str().to_owned())
                    .collect(),
            });
        }

        candidates.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(candidates)
    }

    /// Picks stemcells.
    ///
    /// For each stemcell name, the unused versions are ordered and all
    /// but the newest `stemcells_to_keep` are picked. The result is
    /// computed once per picker.
    pub async fn stemcells(&self) -> DirectorResult<Vec<StemcellCandidate>> {
        self.stemcells
            .get_or_try_init(|| self.pick_stemcells())
            .await
            .map(Clone::clone)
    }

    async fn pick_stemcells(&self) -> DirectorResult<Vec<StemcellCandidate>> {
        let stemcells = Stemcell::find()
            .all(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        let in_use_ids: HashSet<i64> = DeploymentsStemcells::find()
            .all(&self.database)
            .await
            .map_err(DirectorError::database_error)?
            .into_iter()
            .map(|link| link.stemcell_id)
            .collect();

        // A stemcell may have several rows, one per CPI
        let in_use: HashSet<(&str, &str)> = stemcells
            .iter()
            .filter(|s| in_use_ids.contains(&s.id))
            .map(|s| (s.name.as_str(), s.version.as_str()))
            .collect();

        let mut by_name: BTreeMap<&str, Vec<(Version, StemcellCandidate)>> = BTreeMap::new();
        let mut seen = HashSet::new();

        for stemcell in &stemcells {
            let key = (stemcell.name.as_str(), stemcell.version.as_str());
            if in_use.contains(&key) || !seen.insert(key) {
                continue;
            }

            let version = match Version::parse(&stemcell.version) {
                Ok(version) => version,
                Err(e) => {
                    tracing::warn!("Not cleaning up stemcell {}: {}", stemcell.name, e);
                    continue;
                }
            };

            by_name.entry(stemcell.name.as_str()).or_default().push((
                version,
                StemcellCandidate {
                    name: stemcell.name.clone(),
                    operating_system: stemcell.operating_system.clone(),
                    version: stemcell.version.clone(),
                },
            ));
        }

        let mut candidates = Vec::new();
        for (_, mut versions) in by_name {
            versions.sort_by(|a, b| a.0.cmp(&b.0));

            let excess = versions.len().saturating_sub(self.policy.stemcells_to_keep);
            candidates.extend(versions.into_iter().take(excess).map(|(_, s)| s));
        }

        Ok(candidates)
    }

    /// Picks compiled packages.
    ///
    /// Only a full wipe deletes them, and only those compiled against a
    /// stemcell that was itself picked. Whether the stemcell is actually
    /// deleted does not matter.
    pub async fn compiled_packages(&self) -> DirectorResult<Vec<CompiledPackageCandidate>> {
        if !self.policy.remove_all {
            return Ok(Vec::new());
        }

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for stemcell in self.stemcells().await? {
            let compiled_packages = CompiledPackage::find()
                .filter(compiled_package::Column::StemcellOs.eq(stemcell.operating_system.as_str()))
                .filter(compiled_package::Column::StemcellVersion.eq(stemcell.version.as_str()))
                .order_by_asc(compiled_package::Column::Id)
                .find_also_related(Package)
                .all(&self.database)
                .await
                .map_err(DirectorError::database_error)?;

            for (compiled_package, package) in compiled_packages {
                if !seen.insert(compiled_package.id) {
                    continue;
                }

                candidates.push(CompiledPackageCandidate {
                    compiled_package,
                    package_name: package.map(|p| p.name),
                });
            }
        }

        Ok(candidates)
    }

    /// Picks orphaned disks.
    ///
    /// Only a full wipe deletes them.
    pub async fn orphan_disks(&self) -> DirectorResult<Vec<OrphanDiskModel>> {
        if !self.policy.remove_all {
            return Ok(Vec::new());
        }

        OrphanDisk::find()
            .all(&self.database)
            .await
            .map_err(DirectorError::database_error)
    }

    /// Picks exported release tarballs.
    pub async fn exported_releases(&self) -> DirectorResult<Vec<BlobModel>> {
        Blob::find()
            .filter(blob::Column::BlobType.eq(blob::EXPORTED_RELEASE))
            .order_by_asc(blob::Column::Id)
            .all(&self.database)
            .await
            .map_err(DirectorError::database_error)
    }

    /// Picks DNS blobs.
    ///
    /// A DNS blob is picked if it is older than `dns_blob_max_age` and
    /// is not one of the `dns_blobs_to_keep` most recent ones.
    pub async fn dns_blobs(&self) -> DirectorResult<Vec<BlobModel>> {
        // An age too large to represent keeps every blob
        let cutoff = ChronoDuration::from_std(self.policy.dns_blob_max_age)
            .ok()
            .and_then(|max_age| Utc::now().checked_sub_signed(max_age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let recent: Vec<i64> = LocalDnsBlob::find()
            .order_by_desc(local_dns_blob::Column::Id)
            .limit(self.policy.dns_blobs_to_keep as u64)
            .all(&self.database)
            .await
            .map_err(DirectorError::database_error)?
            .into_iter()
            .map(|dns_blob| dns_blob.id)
            .collect();

        let expired = LocalDnsBlob::find()
            .filter(local_dns_blob::Column::CreatedAt.lt(cutoff))
            .filter(local_dns_blob::Column::Id.is_not_in(recent))
            .order_by_asc(local_dns_blob::Column::Id)
            .find_also_related(Blob)
            .all(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        Ok(expired.into_iter().filter_map(|(_, blob)| blob).collect())
    }

    /// Lists everything a pass with this policy would delete.
    pub async fn show_all(&self) -> DirectorResult<CleanableArtifacts> {
        Ok(CleanableArtifacts {
            releases: self.releases().await?,
            stemcells: self
                .stemcells()
                .await?
                .iter()
                .map(StemcellCandidate::label)
                .collect(),
            compiled_packages: self
                .compiled_packages()
                .await?
                .iter()
                .map(CompiledPackageCandidate::label)
                .collect(),
            orphaned_disks: self
                .orphan_disks()
                .await?
                .into_iter()
                .map(|disk| disk.disk_cid)
                .collect(),
            orphaned_vms: self
                .orphaned_vms()
                .await?
                .into_iter()
                .map(|vm| vm.cid)
                .collect(),
            exported_releases: self
                .exported_releases()
                .await?
                .into_iter()
                .map(|blob| blob.blobstore_id)
                .collect(),
            dns_blobs: self
                .dns_blobs()
                .await?
                .into_iter()
                .map(|blob| blob.blobstore_id)
                .collect(),
        })
    }
}
