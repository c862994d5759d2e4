//! A base VM image.

use sea_orm::entity::prelude::*;

pub type StemcellModel = Model;

/// A stemcell.
///
/// The same name and version may appear in more than one row, for
/// example when a stemcell was uploaded to several CPIs.
#[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "stemcell")]
pub struct Model {
    /// Unique numeric ID of the stemcell.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Name of the stemcell.
    #[sea_orm(indexed)]
    pub name: String,

    /// Operating system of the stemcell.
    pub operating_system: String,

    /// Version of the stemcell.
    pub version: String,

    /// Cloud ID of the uploaded image.
    pub cid: String,

    /// Name of the CPI the image was uploaded to.
    pub cpi: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
