//! A named release.

use sea_orm::entity::prelude::*;

pub type ReleaseModel = Model;

/// A release.
///
/// A release with no versions left is garbage and gets removed by cleanup.
#[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "release")]
pub struct Model {
    /// Unique numeric ID of the release.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Unique name of the release.
    #[sea_orm(unique, indexed)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::release_version::Entity")]
    ReleaseVersion,
}

impl Related<super::release_version::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReleaseVersion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
