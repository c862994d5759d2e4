use sea_orm_migration::prelude::*;

use crate::database::entity::{compiled_package, package, stemcell, stemcell_upload};

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240301_000002_create_stemcell_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(stemcell::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(stemcell::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(stemcell::Column::Name).string().not_null())
                    .col(
                        ColumnDef::new(stemcell::Column::OperatingSystem)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(stemcell::Column::Version).string().not_null())
                    .col(ColumnDef::new(stemcell::Column::Cid).string().not_null())
                    .col(ColumnDef::new(stemcell::Column::Cpi).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-stemcell-name-version")
                    .table(stemcell::Entity)
                    .col(stemcell::Column::Name)
                    .col(stemcell::Column::Version)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(stemcell_upload::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(stemcell_upload::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(stemcell_upload::Column::Name)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(stemcell_upload::Column::Version)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(stemcell_upload::Column::Cpi).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(compiled_package::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(compiled_package::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(compiled_package::Column::PackageId).big_integer())
                    .col(
                        ColumnDef::new(compiled_package::Column::StemcellOs)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(compiled_package::Column::StemcellVersion)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(compiled_package::Column::BlobstoreId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(compiled_package::Column::Sha1).string().not_null())
                    .col(
                        ColumnDef::new(compiled_package::Column::Build)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(compiled_package::Column::DependencyKey)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKeyCreateStatement::new()
                            .name("fk_compiled_package_package")
                            .from_tbl(compiled_package::Entity)
                            .from_col(compiled_package::Column::PackageId)
                            .to_tbl(package::Entity)
                            .to_col(package::Column::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-compiled-package-stemcell")
                    .table(compiled_package::Entity)
                    .col(compiled_package::Column::StemcellOs)
                    .col(compiled_package::Column::StemcellVersion)
                    .to_owned(),
            )
            .await
    }
}
