//! A package compiled against a stemcell.

use sea_orm::entity::prelude::*;

pub type CompiledPackageModel = Model;

/// A package compiled against a specific stemcell OS and version.
///
/// ## Vacated rows
///
/// `package_id` is set to NULL when the source package row goes away
/// without going through the package deleter. Such a row is a dangling
/// reference: its blob is no longer owned by anything we track, and
/// cleanup treats it as already vacated.
#[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "compiled_package")]
pub struct Model {
    /// Unique numeric ID of the compiled package.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// ID of the source package.
    #[sea_orm(indexed)]
    pub package_id: Option<i64>,

    /// Operating system of the stemcell this was compiled against.
    pub stemcell_os: String,

    /// Version of the stemcell this was compiled against.
    pub stemcell_version: String,

    /// ID of the compiled tarball in the blobstore.
    pub blobstore_id: String,

    /// SHA-1 of the compiled tarball.
    pub sha1: String,

    /// Build number.
    pub build: i32,

    /// Key identifying the compiled dependencies.
    pub dependency_key: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::package::Entity",
        from = "Column::PackageId",
        to = "super::package::Column::Id"
    )]
    Package,
}

impl Related<super::package::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Package.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
