//! Artifact kinds.
//!
//! A maintenance pass visits every kind exactly once, in
//! [`CLEANUP_ORDER`]. The order is significant: compiled packages become
//! eligible based on the stemcells picked earlier in the same pass.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The order in which a maintenance pass processes artifact kinds.
pub const CLEANUP_ORDER: [ArtifactKind; 7] = [
    ArtifactKind::OrphanedVm,
    ArtifactKind::Release,
    ArtifactKind::Stemcell,
    ArtifactKind::CompiledPackage,
    ArtifactKind::OrphanDisk,
    ArtifactKind::ExportedRelease,
    ArtifactKind::DnsBlob,
];

/// A kind of artifact reclaimed by cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// A VM record with no corresponding deployment instance.
    OrphanedVm,

    /// A release version (or an empty release).
    Release,

    /// A stemcell, identified by name and version.
    Stemcell,

    /// A package compiled against a specific stemcell.
    CompiledPackage,

    /// A persistent disk no longer attached to any instance.
    OrphanDisk,

    /// A release tarball produced by an export.
    ExportedRelease,

    /// A blob holding DNS records.
    DnsBlob,
}

impl ArtifactKind {
    /// Returns the name of the progress stage for this kind.
    pub fn stage_name(&self) -> &'static str {
        match self {
            Self::OrphanedVm => "Deleting orphaned vms",
            Self::Release => "Deleting releases",
            Self::Stemcell => "Deleting stemcells",
            Self::CompiledPackage => "Deleting compiled packages",
            Self::OrphanDisk => "Deleting orphaned disks",
            Self::ExportedRelease => "Deleting exported releases",
            Self::DnsBlob => "Deleting dns blobs",
        }
    }

    /// Returns a short machine-friendly identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrphanedVm => "orphaned_vms",
            Self::Release => "releases",
            Self::Stemcell => "stemcells",
            Self::CompiledPackage => "compiled_packages",
            Self::OrphanDisk => "orphaned_disks",
            Self::ExportedRelease => "exported_releases",
            Self::DnsBlob => "dns_blobs",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
