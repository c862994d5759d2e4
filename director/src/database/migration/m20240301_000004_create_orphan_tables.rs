use sea_orm_migration::prelude::*;

use crate::database::entity::{orphan_disk, orphan_snapshot, orphaned_vm};

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240301_000004_create_orphan_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(orphan_disk::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(orphan_disk::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(orphan_disk::Column::DiskCid)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(orphan_disk::Column::Size).integer())
                    .col(
                        ColumnDef::new(orphan_disk::Column::DeploymentName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(orphan_disk::Column::InstanceName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(orphan_disk::Column::AvailabilityZone).string())
                    .col(
                        ColumnDef::new(orphan_disk::Column::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(orphan_snapshot::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(orphan_snapshot::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(orphan_snapshot::Column::OrphanDiskId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(orphan_snapshot::Column::SnapshotCid)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(orphan_snapshot::Column::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKeyCreateStatement::new()
                            .name("fk_orphan_snapshot_orphan_disk")
                            .from_tbl(orphan_snapshot::Entity)
                            .from_col(orphan_snapshot::Column::OrphanDiskId)
                            .to_tbl(orphan_disk::Entity)
                            .to_col(orphan_disk::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(orphaned_vm::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(orphaned_vm::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(orphaned_vm::Column::Cid)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(orphaned_vm::Column::Cpi).string())
                    .col(ColumnDef::new(orphaned_vm::Column::AvailabilityZone).string())
                    .col(
                        ColumnDef::new(orphaned_vm::Column::OrphanedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
