//! A deployable job definition of a release.

use sea_orm::entity::prelude::*;

pub type TemplateModel = Model;

/// A job template.
#[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "template")]
pub struct Model {
    /// Unique numeric ID of the template.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// ID of the release the template belongs to.
    #[sea_orm(indexed)]
    pub release_id: i64,

    /// Name of the job.
    pub name: String,

    /// Version of the job.
    pub version: String,

    /// Fingerprint of the job inputs.
    pub fingerprint: String,

    /// ID of the job tarball in the blobstore.
    pub blobstore_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
