//! Retention policies.

use std::time::Duration;

use dockyard::api::v1::cleanup::CleanupRequest;
use tokio::sync::Semaphore;

use crate::config::CleanupConfig;
use crate::error::{DirectorError, DirectorResult};

/// The resolved parameters of one maintenance pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupPolicy {
    /// Whether orphaned disks, orphaned VMs and compiled packages are
    /// subject to deletion.
    pub remove_all: bool,

    /// Number of unused versions kept per release.
    pub releases_to_keep: usize,

    /// Number of unused versions kept per stemcell name.
    pub stemcells_to_keep: usize,

    /// DNS blobs younger than this are kept.
    pub dns_blob_max_age: Duration,

    /// Number of most recent DNS blobs kept regardless of age.
    pub dns_blobs_to_keep: usize,
}

impl CleanupPolicy {
    /// Resolves a cleanup request.
    ///
    /// A full wipe keeps nothing except the current DNS blob when
    /// deployments still depend on it. A conservative pass takes its
    /// retention from the configuration.
    pub fn resolve(
        request: &CleanupRequest,
        config: &CleanupConfig,
        deployment_count: u64,
    ) -> DirectorResult<Self> {
        if config.max_threads == 0 {
            return Err(DirectorError::policy_error("max-threads must be positive"));
        }

        if config.max_threads > Semaphore::MAX_PERMITS {
            return Err(DirectorError::policy_error(format!(
                "max-threads must be at most {}",
                Semaphore::MAX_PERMITS
            )));
        }

        if request.remove_all {
            return Ok(Self {
                remove_all: true,
                releases_to_keep: 0,
                stemcells_to_keep: 0,
                dns_blob_max_age: Duration::ZERO,
                dns_blobs_to_keep: if deployment_count > 0 { 1 } else { 0 },
            });
        }

        // A conservative pass that keeps nothing would be a full wipe
        // that spares disks and VMs
        if config.releases_to_keep == 0 {
            return Err(DirectorError::policy_error(
                "releases-to-keep must be positive for a conservative cleanup",
            ));
        }

        if config.stemcells_to_keep == 0 {
            return Err(DirectorError::policy_error(
                "stemcells-to-keep must be positive for a conservative cleanup",
            ));
        }

        Ok(Self {
            remove_all: false,
            releases_to_keep: config.releases_to_keep,
            stemcells_to_keep: config.stemcells_to_keep,
            dns_blob_max_age: config.dns_blob_max_age,
            dns_blobs_to_keep: config.dns_blobs_to_keep,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_wipe() {
        let config = CleanupConfig::default();
        let request = CleanupRequest { remove_all: true };

        let policy = CleanupPolicy::resolve(&request, &config, 0).unwrap();
        assert_eq!(0, policy.releases_to_keep);
        assert_eq!(0, policy.stemcells_to_keep);
        assert_eq!(Duration::ZERO, policy.dns_blob_max_age);
        assert_eq!(0, policy.dns_blobs_to_keep);

        let policy = CleanupPolicy::resolve(&request, &config, 3).unwrap();
        assert_eq!(1, policy.dns_blobs_to_keep);
    }

    #[test]
    fn test_conservative() {
        let config = CleanupConfig::default();
        let policy = CleanupPolicy::resolve(&CleanupRequest::default(), &config, 3).unwrap();

        assert!(!policy.remove_all);
        assert_eq!(2, policy.releases_to_keep);
        assert_eq!(2, policy.stemcells_to_keep);
        assert_eq!(Duration::from_secs(3600), policy.dns_blob_max_age);
        assert_eq!(10, policy.dns_blobs_to_keep);
    }

    #[test]
    fn test_invalid_policy() {
        let config = CleanupConfig {
            releases_to_keep: 0,
            ..Default::default()
        };
        let err = CleanupPolicy::resolve(&CleanupRequest::default(), &config, 0).unwrap_err();
        assert!(matches!(err, DirectorError::PolicyResolutionError { .. }));

        // Full wipe ignores retention counts
        assert!(CleanupPolicy::resolve(&CleanupRequest { remove_all: true }, &config, 0).is_ok());

        let config = CleanupConfig {
            max_threads: 0,
            ..Default::default()
        };
        let err = CleanupPolicy::resolve(&CleanupRequest { remove_all: true }, &config, 0).unwrap_err();
        assert_eq!("PolicyResolutionError", err.name());
    }

    #[test]
    fn test_max_threads_bound() {
        let config = CleanupConfig {
            max_threads: usize::MAX,
            ..Default::default()
        };
        let err = CleanupPolicy::resolve(&CleanupRequest::default(), &config, 0).unwrap_err();
        assert!(err.to_string().contains("max-threads must be at most"));

        let config = CleanupConfig {
            max_threads: Semaphore::MAX_PERMITS,
            ..Default::default()
        };
        assert!(CleanupPolicy::resolve(&CleanupRequest::default(), &config, 0).is_ok());
    }
}
