use sea_orm_migration::prelude::*;

use crate::database::entity::{
    deployment, deployments_release_versions, deployments_stemcells, release_version, stemcell,
};

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240301_000003_create_deployment_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(deployment::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(deployment::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(deployment::Column::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(deployments_release_versions::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(deployments_release_versions::Column::DeploymentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(deployments_release_versions::Column::ReleaseVersionId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(deployments_release_versions::Column::DeploymentId)
                            .col(deployments_release_versions::Column::ReleaseVersionId),
                    )
                    .foreign_key(
                        ForeignKeyCreateStatement::new()
                            .name("fk_deployments_release_versions_deployment")
                            .from_tbl(deployments_release_versions::Entity)
                            .from_col(deployments_release_versions::Column::DeploymentId)
                            .to_tbl(deployment::Entity)
                            .to_col(deployment::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKeyCreateStatement::new()
                            .name("fk_deployments_release_versions_release_version")
                            .from_tbl(deployments_release_versions::Entity)
                            .from_col(deployments_release_versions::Column::ReleaseVersionId)
                            .to_tbl(release_version::Entity)
                            .to_col(release_version::Column::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(deployments_stemcells::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(deployments_stemcells::Column::DeploymentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(deployments_stemcells::Column::StemcellId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(deployments_stemcells::Column::DeploymentId)
                            .col(deployments_stemcells::Column::StemcellId),
                    )
                    .foreign_key(
                        ForeignKeyCreateStatement::new()
                            .name("fk_deployments_stemcells_deployment")
                            .from_tbl(deployments_stemcells::Entity)
                            .from_col(deployments_stemcells::Column::DeploymentId)
                            .to_tbl(deployment::Entity)
                            .to_col(deployment::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKeyCreateStatement::new()
                            .name("fk_deployments_stemcells_stemcell")
                            .from_tbl(deployments_stemcells::Entity)
                            .from_col(deployments_stemcells::Column::StemcellId)
                            .to_tbl(stemcell::Entity)
                            .to_col(stemcell::Column::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
