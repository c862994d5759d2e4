//! Artifact deleters.
//!
//! Deleters form a tree that mirrors the catalog:
//!
//! ```text
//! NameVersionReleaseDeleter
//! └── ReleaseVersionDeleter
//!     ├── ReleaseDeleter
//!     │   ├── PackageDeleter ── CompiledPackageDeleter
//!     │   └── TemplateDeleter
//!     ├── PackageDeleter
//!     └── TemplateDeleter
//! ```
//!
//! Deleting an artifact that is already gone succeeds. Errors returned
//! from the public `delete` methods are [`DirectorError::DeletionError`]s
//! naming the artifact.

mod blob;
mod compiled_package;
mod orphan_disk;
mod orphaned_vm;
mod package;
mod release;
mod stemcell;
mod template;

use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::cloud::Cloud;
use crate::error::{DirectorError, DirectorResult};
use crate::lock::ResourceLocks;
use crate::storage::StorageBackend;

pub use self::blob::BlobDeleter;
pub use self::compiled_package::CompiledPackageDeleter;
pub use self::orphan_disk::OrphanDiskManager;
pub use self::orphaned_vm::OrphanedVmDeleter;
pub use self::package::PackageDeleter;
pub use self::release::{NameVersionReleaseDeleter, ReleaseDeleter, ReleaseVersionDeleter};
pub use self::stemcell::StemcellDeleter;
pub use self::template::TemplateDeleter;

/// The deleters used by a maintenance pass.
#[derive(Debug)]
pub struct Deleters {
    pub release: NameVersionReleaseDeleter,
    pub stemcell: StemcellDeleter,
    pub compiled_package: Arc<CompiledPackageDeleter>,
    pub orphaned_vm: OrphanedVmDeleter,
    pub orphan_disk: OrphanDiskManager,
    pub blob: BlobDeleter,
}

impl Deleters {
    /// Builds all deleters, innermost first.
    pub fn new(
        database: DatabaseConnection,
        storage: Arc<dyn StorageBackend>,
        cloud: Arc<dyn Cloud>,
        locks: Arc<dyn ResourceLocks>,
        vm_disposal_timeout: Duration,
        cloud_call_timeout: Duration,
    ) -> Self {
        let compiled_package = Arc::new(CompiledPackageDeleter::new(
            database.clone(),
            storage.clone(),
        ));
        let package = Arc::new(PackageDeleter::new(
            database.clone(),
            storage.clone(),
            compiled_package.clone(),
        ));
        let template = Arc::new(TemplateDeleter::new(database.clone(), storage.clone()));
        let release = Arc::new(ReleaseDeleter::new(
            database.clone(),
            package.clone(),
            template.clone(),
        ));
        let release_version = ReleaseVersionDeleter::new(database.clone(), release, package, template);

        Self {
            release: NameVersionReleaseDeleter::new(database.clone(), release_version),
            stemcell: StemcellDeleter::new(database.clone(), cloud.clone(), cloud_call_timeout),
            compiled_package,
            orphaned_vm: OrphanedVmDeleter::new(
                database.clone(),
                cloud.clone(),
                locks,
                vm_disposal_timeout,
            ),
            orphan_disk: OrphanDiskManager::new(database.clone(), cloud, cloud_call_timeout),
            blob: BlobDeleter::new(database, storage),
        }
    }
}

/// Names the artifact in an error, unless a nested deleter already did.
fn wrap_error(result: DirectorResult<()>, artifact: impl FnOnce() -> String) -> DirectorResult<()> {
    result.map_err(|e| match e {
        e @ DirectorError::DeletionError { .. } => e,
        e => DirectorError::deletion_error(artifact(), e),
    })
}
