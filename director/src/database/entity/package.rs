//! A source package of a release.

use sea_orm::entity::prelude::*;

pub type PackageModel = Model;

/// A source package.
///
/// A package is uniquely identified by its name, version and fingerprint
/// within a release.
#[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "package")]
pub struct Model {
    /// Unique numeric ID of the package.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// ID of the release the package belongs to.
    #[sea_orm(indexed)]
    pub release_id: i64,

    /// Name of the package.
    pub name: String,

    /// Version of the package.
    pub version: String,

    /// Fingerprint of the package inputs.
    pub fingerprint: String,

    /// SHA-1 of the package tarball.
    pub sha1: Option<String>,

    /// ID of the package tarball in the blobstore.
    ///
    /// May be absent for packages that were only ever
    /// uploaded in compiled form.
    pub blobstore_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::compiled_package::Entity")]
    CompiledPackage,
}

impl Related<super::compiled_package::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CompiledPackage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
