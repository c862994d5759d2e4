//! Cleanup request and result types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactKind;

/// A request to run a maintenance pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupRequest {
    /// Whether to remove everything that is not in use.
    ///
    /// If false, a conservative pass is run that keeps the most
    /// recent releases and stemcells and leaves orphaned disks and
    /// VMs alone.
    #[serde(default)]
    pub remove_all: bool,
}

/// A release and the versions of it picked for deletion.
///
/// An empty version list means the release itself has no versions left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseCandidate {
    pub name: String,

    /// Versions, oldest first.
    pub versions: Vec<String>,
}

/// A stemcell picked for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemcellCandidate {
    pub name: String,
    pub operating_system: String,
    pub version: String,
}

/// Everything a maintenance pass would delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanableArtifacts {
    pub releases: Vec<ReleaseCandidate>,

    /// Stemcells as `os/version`.
    pub stemcells: Vec<String>,

    /// Compiled packages as `name for os/version`.
    pub compiled_packages: Vec<String>,

    /// Cloud IDs of orphaned disks.
    pub orphaned_disks: Vec<String>,

    /// Cloud IDs of orphaned VMs.
    pub orphaned_vms: Vec<String>,

    /// Blobstore IDs of exported releases.
    pub exported_releases: Vec<String>,

    /// Blobstore IDs of DNS blobs.
    pub dns_blobs: Vec<String>,
}

/// Number of artifacts actually deleted by a maintenance pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupSummary {
    pub releases: usize,
    pub stemcells: usize,
    pub compiled_packages: usize,
    pub orphaned_disks: usize,
    pub orphaned_vms: usize,
    pub exported_releases: usize,
    pub dns_blobs: usize,
}

impl StemcellCandidate {
    /// Returns a `os/version` label.
    pub fn label(&self) -> String {
        format!("{}/{}", self.operating_system, self.version)
    }
}

impl CleanupSummary {
    /// Returns the count for a kind.
    pub fn get(&self, kind: ArtifactKind) -> usize {
        match kind {
            ArtifactKind::OrphanedVm => self.orphaned_vms,
            ArtifactKind::Release => self.releases,
            ArtifactKind::Stemcell => self.stemcells,
            ArtifactKind::CompiledPackage => self.compiled_packages,
            ArtifactKind::OrphanDisk => self.orphaned_disks,
            ArtifactKind::ExportedRelease => self.exported_releases,
            ArtifactKind::DnsBlob => self.dns_blobs,
        }
    }

    /// Sets the count for a kind.
    pub fn set(&mut self, kind: ArtifactKind, count: usize) {
        let slot = match kind {
            ArtifactKind::OrphanedVm => &mut self.orphaned_vms,
            ArtifactKind::Release => &mut self.releases,
            ArtifactKind::Stemcell => &mut self.stemcells,
            ArtifactKind::CompiledPackage => &mut self.compiled_packages,
            ArtifactKind::OrphanDisk => &mut self.orphaned_disks,
            ArtifactKind::ExportedRelease => &mut self.exported_releases,
            ArtifactKind::DnsBlob => &mut self.dns_blobs,
        };

        *slot = count;
    }
}

impl fmt::Display for CleanupSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Deleted {} release(s), {} stemcell(s), {} extra compiled package(s), \
             {} orphaned disk(s), {} orphaned vm(s), {} exported release(s), {} dns blob(s)",
            self.releases,
            self.stemcells,
            self.compiled_packages,
            self.orphaned_disks,
            self.orphaned_vms,
            self.exported_releases,
            self.dns_blobs,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::artifact::CLEANUP_ORDER;

    #[test]
    fn test_summary_message() {
        let mut summary = CleanupSummary::default();
        for (i, kind) in CLEANUP_ORDER.iter().enumerate() {
            summary.set(*kind, i);
        }

        assert_eq!(2, summary.get(ArtifactKind::Stemcell));
        assert_eq!(
            "Deleted 1 release(s), 2 stemcell(s), 3 extra compiled package(s), \
             4 orphaned disk(s), 0 orphaned vm(s), 5 exported release(s), 6 dns blob(s)",
            summary.to_string()
        );
    }

    #[test]
    fn test_request_defaults() {
        let request: CleanupRequest = serde_json::from_str("{}").unwrap();
        assert!(!request.remove_all);

        let request: CleanupRequest = serde_json::from_str(r#"{"remove_all":true}"#).unwrap();
        assert!(request.remove_all);
    }
}
