//! A snapshot of an orphaned disk.

use sea_orm::entity::prelude::*;

pub type OrphanSnapshotModel = Model;

#[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orphan_snapshot")]
pub struct Model {
    /// Unique numeric ID of the snapshot.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// ID of the orphan disk the snapshot was taken of.
    #[sea_orm(indexed)]
    pub orphan_disk_id: i64,

    /// Cloud ID of the snapshot.
    pub snapshot_cid: String,

    /// Timestamp when the snapshot was taken.
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orphan_disk::Entity",
        from = "Column::OrphanDiskId",
        to = "super::orphan_disk::Column::Id"
    )]
    OrphanDisk,
}

impl Related<super::orphan_disk::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrphanDisk.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
