//! A deployment.
//!
//! Deployments are managed elsewhere. Cleanup only reads them to find
//! out what is in use.

use sea_orm::entity::prelude::*;

pub type DeploymentModel = Model;

#[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "deployment")]
pub struct Model {
    /// Unique numeric ID of the deployment.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Unique name of the deployment.
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
