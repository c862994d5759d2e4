//! Association between packages and release versions.

use sea_orm::entity::prelude::*;

/// A package being part of a release version.
#[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "packages_release_versions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub package_id: i64,

    #[sea_orm(primary_key, auto_increment = false)]
    pub release_version_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
