//! An opaque blob in the blobstore.

use sea_orm::entity::prelude::*;

pub type BlobModel = Model;

/// Blob type of exported release tarballs.
pub const EXPORTED_RELEASE: &str = "exported-release";

/// Blob type of DNS record blobs.
pub const DNS: &str = "dns";

/// A blob tracked by the director.
#[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "blob")]
pub struct Model {
    /// Unique numeric ID of the blob.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// ID of the content in the blobstore.
    #[sea_orm(unique)]
    pub blobstore_id: String,

    /// SHA-1 of the content.
    pub sha1: String,

    /// Type tag of the blob.
    #[sea_orm(column_name = "type", indexed)]
    pub blob_type: String,

    /// Timestamp when the blob is created.
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::local_dns_blob::Entity")]
    LocalDnsBlob,
}

impl Related<super::local_dns_blob::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LocalDnsBlob.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
