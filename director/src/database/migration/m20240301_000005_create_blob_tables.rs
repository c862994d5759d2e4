use sea_orm_migration::prelude::*;

use crate::database::entity::{blob, local_dns_blob};

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240301_000005_create_blob_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(blob::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(blob::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(blob::Column::BlobstoreId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(blob::Column::Sha1).string().not_null())
                    .col(ColumnDef::new(blob::Column::BlobType).string().not_null())
                    .col(
                        ColumnDef::new(blob::Column::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-blob-type")
                    .table(blob::Entity)
                    .col(blob::Column::BlobType)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(local_dns_blob::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(local_dns_blob::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(local_dns_blob::Column::BlobId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(local_dns_blob::Column::Version)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(local_dns_blob::Column::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKeyCreateStatement::new()
                            .name("fk_local_dns_blob_blob")
                            .from_tbl(local_dns_blob::Entity)
                            .from_col(local_dns_blob::Column::BlobId)
                            .to_tbl(blob::Entity)
                            .to_col(blob::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
