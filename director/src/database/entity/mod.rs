//! Database entities.
//!
//! We use SeaORM and target PostgreSQL (production) and SQLite (development).

pub mod blob;
pub mod compiled_package;
pub mod deployment;
pub mod deployments_release_versions;
pub mod deployments_stemcells;
pub mod local_dns_blob;
pub mod lock;
pub mod orphan_disk;
pub mod orphan_snapshot;
pub mod orphaned_vm;
pub mod package;
pub mod packages_release_versions;
pub mod release;
pub mod release_version;
pub mod stemcell;
pub mod stemcell_upload;
pub mod template;
pub mod templates_release_versions;
