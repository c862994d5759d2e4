//! A version of a release.

use sea_orm::entity::prelude::*;

pub type ReleaseVersionModel = Model;

/// A version of a release.
///
/// Packages and templates are associated through
/// `packages_release_versions` and `templates_release_versions`,
/// and may be shared with other versions of the same release.
#[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "release_version")]
pub struct Model {
    /// Unique numeric ID of the release version.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// ID of the release this version belongs to.
    #[sea_orm(indexed)]
    pub release_id: i64,

    /// The version string, unique within the release.
    pub version: String,

    /// Commit hash the release was built from.
    pub commit_hash: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::release::Entity",
        from = "Column::ReleaseId",
        to = "super::release::Column::Id"
    )]
    Release,
}

impl Related<super::release::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Release.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
