//! A VM left behind by a deployment.

use sea_orm::entity::prelude::*;

pub type OrphanedVmModel = Model;

/// An orphaned VM.
#[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orphaned_vm")]
pub struct Model {
    /// Unique numeric ID of the orphaned VM.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Cloud ID of the VM.
    #[sea_orm(unique)]
    pub cid: String,

    /// Name of the CPI the VM was created with.
    pub cpi: Option<String>,

    /// Availability zone of the VM.
    pub availability_zone: Option<String>,

    /// Timestamp when the VM was orphaned.
    pub orphaned_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
