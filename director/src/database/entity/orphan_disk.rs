//! A persistent disk detached from its instance.

use sea_orm::entity::prelude::*;

pub type OrphanDiskModel = Model;

/// An orphaned persistent disk.
#[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orphan_disk")]
pub struct Model {
    /// Unique numeric ID of the orphan disk.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Cloud ID of the disk.
    #[sea_orm(unique)]
    pub disk_cid: String,

    /// Size of the disk in MiB.
    pub size: Option<i32>,

    /// Deployment the disk was attached in.
    pub deployment_name: String,

    /// Instance the disk was attached to.
    pub instance_name: String,

    /// Availability zone of the disk.
    pub availability_zone: Option<String>,

    /// Timestamp when the disk was orphaned.
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::orphan_snapshot::Entity")]
    OrphanSnapshot,
}

impl Related<super::orphan_snapshot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrphanSnapshot.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
