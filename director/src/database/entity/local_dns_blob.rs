//! A version of the DNS records blob.

use sea_orm::entity::prelude::*;

pub type LocalDnsBlobModel = Model;

/// A published version of the DNS records.
#[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "local_dns_blob")]
pub struct Model {
    /// Unique numeric ID.
    ///
    /// Higher IDs are more recent.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// ID of the blob holding the records.
    #[sea_orm(indexed)]
    pub blob_id: i64,

    /// Version of the DNS records.
    pub version: i64,

    /// Timestamp when the records were published.
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::blob::Entity",
        from = "Column::BlobId",
        to = "super::blob::Column::Id"
    )]
    Blob,
}

impl Related<super::blob::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blob.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
