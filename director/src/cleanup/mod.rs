//! Artifact cleanup.
//!
//! A maintenance pass deletes artifacts one kind at a time in
//! [`CLEANUP_ORDER`]. Within a kind, deletions run concurrently on a
//! bounded pool and the pool drains before the next kind starts. A
//! failure to delete one artifact is logged and the pass moves on. Only
//! failures that are not tied to a single artifact abort the pass, and
//! kinds that already ran stay deleted.

pub mod deleter;
pub mod picker;
pub mod policy;


use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sea_orm::DatabaseConnection;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time;
use tracing::instrument;

use dockyard::api::v1::cleanup::{
    CleanableArtifacts, CleanupRequest, CleanupSummary, ReleaseCandidate,
};
use dockyard::artifact::{ArtifactKind, CLEANUP_ORDER};

use crate::cloud::Cloud;
use crate::config::{CleanupConfig, Config};
use crate::database::DirectorDatabase;
use crate::error::{DirectorError, DirectorResult};
use crate::event_log::{begin_stage, EventLog, Stage, TracingEventLog};
use crate::lock::{release_lock_name, DatabaseLocks, ResourceLocks};
use crate::metrics::MetricsCollector;
use crate::storage::StorageBackend;
use crate::{State, StateInner};
use deleter::Deleters;
use picker::ArtifactPicker;
use policy::CleanupPolicy;

/// The cleanup coordinator.
#[derive(Debug)]
pub struct Cleanup {
    database: DatabaseConnection,
    deleters: Arc<Deleters>,
    locks: Arc<dyn ResourceLocks>,
    event_log: Arc<dyn EventLog>,
    metrics: Arc<MetricsCollector>,
    config: CleanupConfig,
}

impl Cleanup {
    pub fn new(
        database: DatabaseConnection,
        storage: Arc<dyn StorageBackend>,
        cloud: Arc<dyn Cloud>,
        locks: Arc<dyn ResourceLocks>,
        event_log: Arc<dyn EventLog>,
        metrics: Arc<MetricsCollector>,
        config: CleanupConfig,
    ) -> Self {
        let deleters = Arc::new(Deleters::new(
            database.clone(),
            storage,
            cloud,
            locks.clone(),
            config.vm_disposal_timeout,
            config.cloud_call_timeout,
        ));

        Self {
            database,
            deleters,
            locks,
            event_log,
            metrics,
            config,
        }
    }

    /// Runs one maintenance pass.
    #[instrument(skip_all, fields(remove_all = request.remove_all))]
    pub async fn perform(&self, request: &CleanupRequest) -> DirectorResult<CleanupSummary> {
        let policy = self.resolve_policy(request).await?;
        let picker = ArtifactPicker::new(self.database.clone(), policy);

        let mut summary = CleanupSummary::default();

        for kind in CLEANUP_ORDER {
            let deleted = match kind {
                ArtifactKind::OrphanedVm => self.delete_orphaned_vms(&picker).await?,
                ArtifactKind::Release => self.delete_releases(&picker).await?,
                ArtifactKind::Stemcell => self.delete_stemcells(&picker).await?,
                ArtifactKind::CompiledPackage => self.delete_compiled_packages(&picker).await?,
                ArtifactKind::OrphanDisk => self.delete_orphan_disks(&picker).await?,
                ArtifactKind::ExportedRelease => self.delete_exported_releases(&picker).await?,
                ArtifactKind::DnsBlob => self.delete_dns_blobs(&picker).await?,
            };

            summary.set(kind, deleted);
        }

        tracing::info!("{}", summary);
        self.metrics.record_cleanup(&summary);

        Ok(summary)
    }

    /// Lists what a pass would delete, without deleting anything.
    pub async fn show_all(&self, request: &CleanupRequest) -> DirectorResult<CleanableArtifacts> {
        let policy = self.resolve_policy(request).await?;
        ArtifactPicker::new(self.database.clone(), policy)
            .show_all()
            .await
    }

    async fn resolve_policy(&self, request: &CleanupRequest) -> DirectorResult<CleanupPolicy> {
        let deployments = self.database.count_deployments().await?;
        CleanupPolicy::resolve(request, &self.config, deployments)
    }

    fn begin_stage(&self, kind: ArtifactKind, total: usize) -> Arc<Stage> {
        begin_stage(self.event_log.clone(), kind.stage_name(), total)
    }

    async fn delete_orphaned_vms(&self, picker: &ArtifactPicker) -> DirectorResult<usize> {
        let orphaned_vms = picker.orphaned_vms().await?;
        let stage = self.begin_stage(ArtifactKind::OrphanedVm, orphaned_vms.len());
        let deleters = self.deleters.clone();

        fan_out(self.config.max_threads, orphaned_vms, move |orphaned_vm| {
            let deleters = deleters.clone();
            let stage = stage.clone();
            async move {
                let result = stage
                    .advance_and_track(&orphaned_vm.cid, deleters.orphaned_vm.delete(&orphaned_vm))
                    .await;
                usize::from(result.is_ok())
            }
        })
        .await
    }

    async fn delete_releases(&self, picker: &ArtifactPicker) -> DirectorResult<usize> {
        let releases = picker.releases().await?;
        let total = releases.iter().map(|r| release_labels(r).len()).sum();
        let stage = self.begin_stage(ArtifactKind::Release, total);
        let deleters = self.deleters.clone();
        let locks = self.locks.clone();
        let timeout = self.config.release_lock_timeout;

        fan_out(self.config.max_threads, releases, move |release| {
            let deleters = deleters.clone();
            let locks = locks.clone();
            let stage = stage.clone();
            async move { delete_release(&deleters, locks.as_ref(), &stage, release, timeout).await }
        })
        .await
    }

    async fn delete_stemcells(&self, picker: &ArtifactPicker) -> DirectorResult<usize> {
        let stemcells = picker.stemcells().await?;
        let stage = self.begin_stage(ArtifactKind::Stemcell, stemcells.len());
        let deleters = self.deleters.clone();

        fan_out(self.config.max_threads, stemcells, move |stemcell| {
            let deleters = deleters.clone();
            let stage = stage.clone();
            async move {
                let label = format!("{}/{}", stemcell.name, stemcell.version);
                let result = stage
                    .advance_and_track(&label, deleters.stemcell.delete(&stemcell))
                    .await;
                usize::from(result.is_ok())
            }
        })
        .await
    }

    async fn delete_compiled_packages(&self, picker: &ArtifactPicker) -> DirectorResult<usize> {
        let (vacated, compiled_packages): (Vec<_>, Vec<_>) = picker
            .compiled_packages()
            .await?
            .into_iter()
            .partition(|candidate| candidate.is_vacated());

        for candidate in &vacated {
            tracing::debug!(
                "Compiled package {} has already been vacated",
                candidate.compiled_package.id
            );
        }

        let stage = self.begin_stage(ArtifactKind::CompiledPackage, compiled_packages.len());
        let deleters = self.deleters.clone();

        fan_out(self.config.max_threads, compiled_packages, move |candidate| {
            let deleters = deleters.clone();
            let stage = stage.clone();
            async move {
                let result = stage
                    .advance_and_track(
                        &candidate.label(),
                        deleters.compiled_package.delete(&candidate.compiled_package),
                    )
                    .await;
                usize::from(result.is_ok())
            }
        })
        .await
    }

    async fn delete_orphan_disks(&self, picker: &ArtifactPicker) -> DirectorResult<usize> {
        let orphan_disks = picker.orphan_disks().await?;
        let stage = self.begin_stage(ArtifactKind::OrphanDisk, orphan_disks.len());
        let deleters = self.deleters.clone();

        fan_out(self.config.max_threads, orphan_disks, move |orphan_disk| {
            let deleters = deleters.clone();
            let stage = stage.clone();
            async move {
                let result = stage
                    .advance_and_track(
                        &orphan_disk.disk_cid,
                        deleters.orphan_disk.delete_orphan_disk(&orphan_disk),
                    )
                    .await;
                usize::from(result.is_ok())
            }
        })
        .await
    }

    async fn delete_exported_releases(&self, picker: &ArtifactPicker) -> DirectorResult<usize> {
        let blobs = picker.exported_releases().await?;
        let stage = self.begin_stage(ArtifactKind::ExportedRelease, blobs.len());
        self.delete_blobs(stage, blobs).await
    }

    async fn delete_dns_blobs(&self, picker: &ArtifactPicker) -> DirectorResult<usize> {
        let blobs = picker.dns_blobs().await?;
        let stage = self.begin_stage(ArtifactKind::DnsBlob, blobs.len());
        self.delete_blobs(stage, blobs).await
    }

    async fn delete_blobs(
        &self,
        stage: Arc<Stage>,
        blobs: Vec<crate::database::entity::blob::BlobModel>,
    ) -> DirectorResult<usize> {
        let deleters = self.deleters.clone();

        fan_out(self.config.max_threads, blobs, move |blob| {
            let deleters = deleters.clone();
            let stage = stage.clone();
            async move {
                let result = stage
                    .advance_and_track(&blob.blobstore_id, deleters.blob.delete(&blob))
                    .await;
                usize::from(result.is_ok())
            }
        })
        .await
    }
}

/// Deletes the picked versions of one release under the release lock.
///
/// Returns the number of deletions. If the lock cannot be acquired in
/// time, every item of the release is recorded as failed and the
/// release is left for the next pass.
async fn delete_release(
    deleters: &Deleters,
    locks: &dyn ResourceLocks,
    stage: &Stage,
    release: ReleaseCandidate,
    timeout: Duration,
) -> usize {
    let guard = match locks.acquire(&release_lock_name(&release.name), timeout).await {
        Ok(guard) => guard,
        Err(e) => {
            tracing::warn!("Skipping release {} in this pass: {}", release.name, e);

            let reason = e.to_string();
            for label in release_labels(&release) {
                let _ = stage
                    .advance_and_track(&label, async { Err::<(), _>(reason.clone()) })
                    .await;
            }

            return 0;
        }
    };
    tracing::debug!("Holding {}", guard.name());

    if release.versions.is_empty() {
        let result = stage
            .advance_and_track(
                &release.name,
                deleters.release.find_and_delete_empty_release(&release.name),
            )
            .await;
        return usize::from(result.is_ok());
    }

    let mut deleted = 0;
    for version in &release.versions {
        let label = format!("{}/{}", release.name, version);
        let result = stage
            .advance_and_track(
                &label,
                deleters.release.find_and_delete_release(&release.name, version),
            )
            .await;

        if result.is_ok() {
            deleted += 1;
        }
    }

    deleted
}

fn release_labels(release: &ReleaseCandidate) -> Vec<String> {
    if release.versions.is_empty() {
        return vec![release.name.clone()];
    }

    release
        .versions
        .iter()
        .map(|version| format!("{}/{}", release.name, version))
        .collect()
}

/// Runs `work` on every item with at most `max_threads` running at once.
///
/// Returns the sum of what the tasks return. A task that panics fails
/// the whole pool once the remaining tasks are done.
async fn fan_out<T, F, Fut>(max_threads: usize, items: Vec<T>, work: F) -> DirectorResult<usize>
where
    T: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = usize> + Send + 'static,
{
    let limit = Arc::new(Semaphore::new(max_threads));
    let mut tasks = JoinSet::new();

    for item in items {
        let limit = limit.clone();
        let task = work(item);

        tasks.spawn(async move {
            let _permit = limit.acquire_owned().await;
            task.await
        });
    }

    let mut total = 0;
    let mut failure = None;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(count) => total += count,
            Err(e) => {
                tracing::error!("Cleanup worker failed: {}", e);
                failure.get_or_insert(e);
            }
        }
    }

    match failure {
        Some(e) => Err(DirectorError::WorkerPoolError(e.into())),
        None => Ok(total),
    }
}

async fn build_cleanup(state: &State) -> DirectorResult<Cleanup> {
    let database = state.database().await?.clone();
    let storage = state.storage().await?.clone();
    let config = &state.config.cleanup;

    let locks: Arc<dyn ResourceLocks> = Arc::new(DatabaseLocks::new(
        database.clone(),
        config.lock_expiration,
    ));
    let event_log: Arc<dyn EventLog> = Arc::new(TracingEventLog);

    Ok(Cleanup::new(
        database,
        storage,
        state.cloud(),
        locks,
        event_log,
        state.metrics.clone(),
        config.clone(),
    ))
}

/// Runs a conservative cleanup periodically.
pub async fn run_cleanup(config: Config) {
    let interval = config.cleanup.interval;

    if interval == Duration::ZERO {
        // disabled
        return;
    }

    let state = match StateInner::new(config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Scheduled cleanup cannot start: {}", e);
            return;
        }
    };

    loop {
        // We don't stop even if it errors
        if let Err(e) = run_cleanup_with_state(&state, &CleanupRequest::default()).await {
            tracing::warn!("Scheduled cleanup failed: {}", e);
        }

        time::sleep(interval).await;
    }
}

/// Runs a cleanup once.
pub async fn run_cleanup_once(config: Config, request: CleanupRequest) -> Result<CleanupSummary> {
    let state = StateInner::new(config).await?;
    let summary = run_cleanup_with_state(&state, &request).await?;

    Ok(summary)
}

/// Lists what a cleanup would delete.
pub async fn show_cleanable(config: Config, request: CleanupRequest) -> Result<CleanableArtifacts> {
    let state = StateInner::new(config).await?;
    let cleanup = build_cleanup(&state).await?;
    let cleanable = cleanup.show_all(&request).await?;

    Ok(cleanable)
}

#[instrument(skip_all)]
async fn run_cleanup_with_state(
    state: &State,
    request: &CleanupRequest,
) -> DirectorResult<CleanupSummary> {
    tracing::info!("Running cleanup...");

    let cleanup = build_cleanup(state).await?;
    cleanup.perform(request).await
}
