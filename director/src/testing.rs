//! Fakes and fixtures for tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, ConnectOptions, Database, DatabaseConnection};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time;

use crate::cloud::{Cloud, CloudError};
use crate::database::entity;
use crate::database::migration::{Migrator, MigratorTrait};
use crate::error::{DirectorError, DirectorResult};
use crate::event_log::{Event, EventLog};
use crate::storage::{Download, StorageBackend};

/// Returns a migrated in-memory SQLite catalog.
pub async fn memory_database() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

/// An in-memory blobstore.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryStorageInner>>,
}

#[derive(Debug, Default)]
struct MemoryStorageInner {
    files: HashMap<String, Vec<u8>>,
    deletions: HashMap<String, usize>,
    failing: HashSet<String>,
}

impl MemoryStorage {
    pub fn put(&self, name: &str, content: &[u8]) {
        self.lock().files.insert(name.to_owned(), content.to_vec());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().files.contains_key(name)
    }

    /// Returns how many times deletion of a file was attempted.
    pub fn deletions(&self, name: &str) -> usize {
        self.lock().deletions.get(name).copied().unwrap_or(0)
    }

    /// Makes deletions of a file fail.
    pub fn fail_deletion(&self, name: &str) {
        self.lock().failing.insert(name.to_owned());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryStorageInner> {
        self.inner.lock().unwrap()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn upload_file(
        &self,
        name: String,
        stream: &mut (dyn AsyncRead + Unpin + Send),
    ) -> DirectorResult<()> {
        let mut content = Vec::new();
        stream
            .read_to_end(&mut content)
            .await
            .map_err(DirectorError::storage_error)?;
        self.lock().files.insert(name, content);
        Ok(())
    }

    async fn download_file(&self, name: String) -> DirectorResult<Download> {
        let content = self
            .lock()
            .files
            .get(&name)
            .cloned()
            .ok_or_else(|| DirectorError::StorageError(anyhow!("{} does not exist", name)))?;
        Ok(Box::new(std::io::Cursor::new(content)))
    }

    async fn delete_file(&self, name: String) -> DirectorResult<()> {
        let mut inner = self.lock();
        *inner.deletions.entry(name.clone()).or_default() += 1;

        if inner.failing.contains(&name) {
            return Err(DirectorError::StorageError(anyhow!(
                "blobstore refused to delete {}",
                name
            )));
        }

        inner.files.remove(&name);
        Ok(())
    }
}

/// A fake infrastructure provider.
#[derive(Debug, Clone, Default)]
pub struct FakeCloud {
    inner: Arc<Mutex<FakeCloudInner>>,
}

#[derive(Debug, Default)]
struct FakeCloudInner {
    calls: Vec<(String, String)>,
    missing: HashSet<String>,
    failing: HashSet<String>,
    hanging: HashSet<String>,
}

impl FakeCloud {
    /// Returns `(method, cid)` for every call made.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.lock().calls.clone()
    }

    /// Makes calls for a resource report it as not found.
    pub fn set_missing(&self, cid: &str) {
        self.lock().missing.insert(cid.to_owned());
    }

    pub fn set_failing(&self, cid: &str) {
        self.lock().failing.insert(cid.to_owned());
    }

    /// Makes calls for a resource never complete.
    pub fn set_hanging(&self, cid: &str) {
        self.lock().hanging.insert(cid.to_owned());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeCloudInner> {
        self.inner.lock().unwrap()
    }

    async fn call(&self, method: &str, kind: &'static str, cid: &str) -> Result<(), CloudError> {
        let hanging = {
            let mut inner = self.lock();
            inner.calls.push((method.to_owned(), cid.to_owned()));

            if inner.missing.contains(cid) {
                return Err(CloudError::NotFound {
                    kind,
                    cid: cid.to_owned(),
                });
            }

            if inner.failing.contains(cid) {
                return Err(CloudError::Failed(anyhow!("{} {} failed", method, cid)));
            }

            inner.hanging.contains(cid)
        };

        if hanging {
            time::sleep(Duration::from_secs(3600)).await;
        }

        Ok(())
    }
}

#[async_trait]
impl Cloud for FakeCloud {
    async fn delete_vm(&self, cid: &str) -> Result<(), CloudError> {
        self.call("delete_vm", "VM", cid).await
    }

    async fn delete_disk(&self, cid: &str) -> Result<(), CloudError> {
        self.call("delete_disk", "Disk", cid).await
    }

    async fn delete_snapshot(&self, cid: &str) -> Result<(), CloudError> {
        self.call("delete_snapshot", "Snapshot", cid).await
    }

    async fn delete_stemcell(&self, cid: &str) -> Result<(), CloudError> {
        self.call("delete_stemcell", "Stemcell", cid).await
    }
}

/// An event log that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    events: Mutex<Vec<Event>>,
}

impl MemoryEventLog {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Returns the events of one stage.
    pub fn stage(&self, name: &str) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.stage == name)
            .collect()
    }
}

impl EventLog for MemoryEventLog {
    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

// Catalog fixtures

pub async fn insert_release(db: &DatabaseConnection, name: &str) -> i64 {
    let model = entity::release::ActiveModel {
        name: Set(name.to_owned()),
        ..Default::default()
    };
    entity::release::Entity::insert(model)
        .exec(db)
        .await
        .unwrap()
        .last_insert_id
}

pub async fn insert_release_version(db: &DatabaseConnection, release_id: i64, version: &str) -> i64 {
    let model = entity::release_version::ActiveModel {
        release_id: Set(release_id),
        version: Set(version.to_owned()),
        commit_hash: Set(Some("abcdef".to_string())),
        ..Default::default()
    };
    entity::release_version::Entity::insert(model)
        .exec(db)
        .await
        .unwrap()
        .last_insert_id
}

/// Inserts a package used by the given release versions.
pub async fn insert_package(
    db: &DatabaseConnection,
    release_id: i64,
    name: &str,
    blobstore_id: Option<&str>,
    release_version_ids: &[i64],
) -> i64 {
    let model = entity::package::ActiveModel {
        release_id: Set(release_id),
        name: Set(name.to_owned()),
        version: Set("1".to_string()),
        fingerprint: Set(format!("{}-fingerprint", name)),
        sha1: Set(blobstore_id.map(|_| "sha1".to_string())),
        blobstore_id: Set(blobstore_id.map(str::to_owned)),
        ..Default::default()
    };
    let id = entity::package::Entity::insert(model)
        .exec(db)
        .await
        .unwrap()
        .last_insert_id;

    for release_version_id in release_version_ids {
        let link = entity::packages_release_versions::ActiveModel {
            package_id: Set(id),
            release_version_id: Set(*release_version_id),
        };
        entity::packages_release_versions::Entity::insert(link)
            .exec_without_returning(db)
            .await
            .unwrap();
    }

    id
}

/// Inserts a template used by the given release versions.
pub async fn insert_template(
    db: &DatabaseConnection,
    release_id: i64,
    name: &str,
    blobstore_id: &str,
    release_version_ids: &[i64],
) -> i64 {
    let model = entity::template::ActiveModel {
        release_id: Set(release_id),
        name: Set(name.to_owned()),
        version: Set("1".to_string()),
        fingerprint: Set(format!("{}-fingerprint", name)),
        blobstore_id: Set(Some(blobstore_id.to_owned())),
        ..Default::default()
    };
    let id = entity::template::Entity::insert(model)
        .exec(db)
        .await
        .unwrap()
        .last_insert_id;

    for release_version_id in release_version_ids {
        let link = entity::templates_release_versions::ActiveModel {
            template_id: Set(id),
            release_version_id: Set(*release_version_id),
        };
        entity::templates_release_versions::Entity::insert(link)
            .exec_without_returning(db)
            .await
            .unwrap();
    }

    id
}

pub async fn insert_compiled_package(
    db: &DatabaseConnection,
    package_id: i64,
    stemcell_os: &str,
    stemcell_version: &str,
    blobstore_id: &str,
) -> i64 {
    let model = entity::compiled_package::ActiveModel {
        package_id: Set(Some(package_id)),
        stemcell_os: Set(stemcell_os.to_owned()),
        stemcell_version: Set(stemcell_version.to_owned()),
        blobstore_id: Set(blobstore_id.to_owned()),
        sha1: Set("sha1".to_string()),
        build: Set(1),
        dependency_key: Set("[]".to_string()),
        ..Default::default()
    };
    entity::compiled_package::Entity::insert(model)
        .exec(db)
        .await
        .unwrap()
        .last_insert_id
}

pub async fn insert_stemcell(
    db: &DatabaseConnection,
    name: &str,
    operating_system: &str,
    version: &str,
) -> i64 {
    let model = entity::stemcell::ActiveModel {
        name: Set(name.to_owned()),
        operating_system: Set(operating_system.to_owned()),
        version: Set(version.to_owned()),
        cid: Set(format!("stemcell-cid-{}-{}", name, version)),
        cpi: Set(None),
        ..Default::default()
    };
    entity::stemcell::Entity::insert(model)
        .exec(db)
        .await
        .unwrap()
        .last_insert_id
}

pub async fn insert_stemcell_upload(db: &DatabaseConnection, name: &str, version: &str) -> i64 {
    let model = entity::stemcell_upload::ActiveModel {
        name: Set(name.to_owned()),
        version: Set(version.to_owned()),
        cpi: Set(None),
        ..Default::default()
    };
    entity::stemcell_upload::Entity::insert(model)
        .exec(db)
        .await
        .unwrap()
        .last_insert_id
}

pub async fn insert_deployment(db: &DatabaseConnection, name: &str) -> i64 {
    let model = entity::deployment::ActiveModel {
        name: Set(name.to_owned()),
        ..Default::default()
    };
    entity::deployment::Entity::insert(model)
        .exec(db)
        .await
        .unwrap()
        .last_insert_id
}

pub async fn use_release_version(db: &DatabaseConnection, deployment_id: i64, release_version_id: i64) {
    let link = entity::deployments_release_versions::ActiveModel {
        deployment_id: Set(deployment_id),
        release_version_id: Set(release_version_id),
    };
    entity::deployments_release_versions::Entity::insert(link)
        .exec_without_returning(db)
        .await
        .unwrap();
}

pub async fn use_stemcell(db: &DatabaseConnection, deployment_id: i64, stemcell_id: i64) {
    let link = entity::deployments_stemcells::ActiveModel {
        deployment_id: Set(deployment_id),
        stemcell_id: Set(stemcell_id),
    };
    entity::deployments_stemcells::Entity::insert(link)
        .exec_without_returning(db)
        .await
        .unwrap();
}

pub async fn insert_orphan_disk(db: &DatabaseConnection, disk_cid: &str) -> i64 {
    let model = entity::orphan_disk::ActiveModel {
        disk_cid: Set(disk_cid.to_owned()),
        size: Set(Some(1024)),
        deployment_name: Set("dep".to_string()),
        instance_name: Set("web/0".to_string()),
        availability_zone: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    entity::orphan_disk::Entity::insert(model)
        .exec(db)
        .await
        .unwrap()
        .last_insert_id
}

pub async fn insert_orphan_snapshot(db: &DatabaseConnection, orphan_disk_id: i64, cid: &str) -> i64 {
    let model = entity::orphan_snapshot::ActiveModel {
        orphan_disk_id: Set(orphan_disk_id),
        snapshot_cid: Set(cid.to_owned()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    entity::orphan_snapshot::Entity::insert(model)
        .exec(db)
        .await
        .unwrap()
        .last_insert_id
}

pub async fn insert_orphaned_vm(db: &DatabaseConnection, cid: &str) -> i64 {
    let model = entity::orphaned_vm::ActiveModel {
        cid: Set(cid.to_owned()),
        cpi: Set(None),
        availability_zone: Set(None),
        orphaned_at: Set(Utc::now()),
        ..Default::default()
    };
    entity::orphaned_vm::Entity::insert(model)
        .exec(db)
        .await
        .unwrap()
        .last_insert_id
}

pub async fn insert_blob(
    db: &DatabaseConnection,
    blobstore_id: &str,
    blob_type: &str,
    created_at: DateTime<Utc>,
) -> i64 {
    let model = entity::blob::ActiveModel {
        blobstore_id: Set(blobstore_id.to_owned()),
        sha1: Set("sha1".to_string()),
        blob_type: Set(blob_type.to_owned()),
        created_at: Set(created_at),
        ..Default::default()
    };
    entity::blob::Entity::insert(model)
        .exec(db)
        .await
        .unwrap()
        .last_insert_id
}

/// Inserts a DNS blob along with its published version.
pub async fn insert_dns_blob(
    db: &DatabaseConnection,
    blobstore_id: &str,
    version: i64,
    created_at: DateTime<Utc>,
) -> i64 {
    let blob_id = insert_blob(db, blobstore_id, entity::blob::DNS, created_at).await;

    let model = entity::local_dns_blob::ActiveModel {
        blob_id: Set(blob_id),
        version: Set(version),
        created_at: Set(created_at),
        ..Default::default()
    };
    entity::local_dns_blob::Entity::insert(model)
        .exec(db)
        .await
        .unwrap()
        .last_insert_id
}

/// Returns the number of rows of an entity.
pub async fn count<E: EntityTrait>(db: &DatabaseConnection) -> u64
where
    E::Model: Sync,
{
    E::find().count(db).await.unwrap()
}
