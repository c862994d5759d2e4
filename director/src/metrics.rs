//! Gauges describing maintenance passes.
//!
//! The collector owns its Prometheus registry. It is created once and
//! handed to whoever records into it. It starts out disabled, in which
//! case nothing is recorded or gathered.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, IntGaugeVec, Opts, Registry};

use dockyard::api::v1::cleanup::CleanupSummary;
use dockyard::artifact::{ArtifactKind, CLEANUP_ORDER};

use crate::error::{DirectorError, DirectorResult};

/// Name of the gauge counting deletions, labelled by `kind`.
pub const DELETED: &str = "cleanup_deleted";

/// Name of the gauge holding the time of the last pass.
pub const LAST_RUN_TIMESTAMP: &str = "cleanup_last_run_timestamp_seconds";

pub struct MetricsCollector {
    enabled: AtomicBool,
    registry: Registry,
    deleted: IntGaugeVec,
    last_run: Gauge,
}

impl MetricsCollector {
    /// Creates a disabled collector with its gauges registered.
    pub fn new() -> DirectorResult<Self> {
        let registry = Registry::new();

        let deleted = IntGaugeVec::new(
            Opts::new(DELETED, "Number of artifacts deleted by the last maintenance pass"),
            &["kind"],
        )
        .map_err(DirectorError::metrics_error)?;

        let last_run = Gauge::with_opts(Opts::new(
            LAST_RUN_TIMESTAMP,
            "Unix time at which the last maintenance pass finished",
        ))
        .map_err(DirectorError::metrics_error)?;

        registry
            .register(Box::new(deleted.clone()))
            .map_err(DirectorError::metrics_error)?;
        registry
            .register(Box::new(last_run.clone()))
            .map_err(DirectorError::metrics_error)?;

        Ok(Self {
            enabled: AtomicBool::new(false),
            registry,
            deleted,
            last_run,
        })
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    /// Disables the collector and resets all gauges.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        self.deleted.reset();
        self.last_run.set(0.0);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Records the outcome of a maintenance pass.
    pub fn record_cleanup(&self, summary: &CleanupSummary) {
        if !self.is_enabled() {
            return;
        }

        for kind in CLEANUP_ORDER {
            self.deleted
                .with_label_values(&[kind.as_str()])
                .set(summary.get(kind) as i64);
        }

        self.last_run.set(Utc::now().timestamp() as f64);
    }

    /// Returns the number of deletions of a kind in the last pass.
    pub fn deleted(&self, kind: ArtifactKind) -> Option<i64> {
        if !self.is_enabled() {
            return None;
        }

        Some(self.deleted.with_label_values(&[kind.as_str()]).get())
    }

    pub fn last_run_timestamp(&self) -> Option<f64> {
        if !self.is_enabled() {
            return None;
        }

        Some(self.last_run.get())
    }

    /// Gathers everything in the registry.
    pub fn gather(&self) -> Vec<MetricFamily> {
        if !self.is_enabled() {
            return Vec::new();
        }

        self.registry.gather()
    }
}

impl fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsCollector")
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_by_default() {
        let metrics = MetricsCollector::new().unwrap();
        let summary = CleanupSummary {
            releases: 1,
            ..Default::default()
        };

        metrics.record_cleanup(&summary);
        assert_eq!(None, metrics.deleted(ArtifactKind::Release));
        assert!(metrics.gather().is_empty());

        metrics.enable();
        assert_eq!(Some(0), metrics.deleted(ArtifactKind::Release));
        metrics.record_cleanup(&summary);
        assert_eq!(Some(1), metrics.deleted(ArtifactKind::Release));

        metrics.disable();
        assert_eq!(None, metrics.deleted(ArtifactKind::Release));
        metrics.enable();
        assert_eq!(Some(0), metrics.deleted(ArtifactKind::Release));
        assert_eq!(Some(0.0), metrics.last_run_timestamp());
    }

    #[test]
    fn test_record_cleanup() {
        let metrics = MetricsCollector::new().unwrap();
        metrics.enable();

        let summary = CleanupSummary {
            releases: 3,
            compiled_packages: 2,
            ..Default::default()
        };
        metrics.record_cleanup(&summary);

        assert_eq!(Some(3), metrics.deleted(ArtifactKind::Release));
        assert_eq!(Some(2), metrics.deleted(ArtifactKind::CompiledPackage));
        assert_eq!(Some(0), metrics.deleted(ArtifactKind::DnsBlob));
        assert!(metrics.last_run_timestamp().unwrap() > 0.0);

        let families = metrics.gather();
        let deleted = families
            .iter()
            .find(|family| family.get_name() == DELETED)
            .unwrap();
        assert_eq!(CLEANUP_ORDER.len(), deleted.get_metric().len());
        assert!(families
            .iter()
            .any(|family| family.get_name() == LAST_RUN_TIMESTAMP));
    }

    #[test]
    fn test_collectors_are_independent() {
        let first = MetricsCollector::new().unwrap();
        let second = MetricsCollector::new().unwrap();
        first.enable();
        second.enable();

        first.record_cleanup(&CleanupSummary {
            stemcells: 4,
            ..Default::default()
        });

        assert_eq!(Some(4), first.deleted(ArtifactKind::Stemcell));
        assert_eq!(Some(0), second.deleted(ArtifactKind::Stemcell));
    }
}
