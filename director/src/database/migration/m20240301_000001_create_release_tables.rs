use sea_orm_migration::prelude::*;

use crate::database::entity::{
    package, packages_release_versions, release, release_version, template,
    templates_release_versions,
};

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240301_000001_create_release_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(release::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(release::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(release::Column::Name)
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
                    .table(release_version::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(release_version::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(release_version::Column::ReleaseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(release_version::Column::Version)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(release_version::Column::CommitHash).string())
                    .foreign_key(
                        ForeignKeyCreateStatement::new()
                            .name("fk_release_version_release")
                            .from_tbl(release_version::Entity)
                            .from_col(release_version::Column::ReleaseId)
                            .to_tbl(release::Entity)
                            .to_col(release::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-release-version-release-version")
                    .table(release_version::Entity)
                    .col(release_version::Column::ReleaseId)
                    .col(release_version::Column::Version)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(package::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(package::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(package::Column::ReleaseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(package::Column::Name).string().not_null())
                    .col(ColumnDef::new(package::Column::Version).string().not_null())
                    .col(
                        ColumnDef::new(package::Column::Fingerprint)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(package::Column::Sha1).string())
                    .col(ColumnDef::new(package::Column::BlobstoreId).string())
                    .foreign_key(
                        ForeignKeyCreateStatement::new()
                            .name("fk_package_release")
                            .from_tbl(package::Entity)
                            .from_col(package::Column::ReleaseId)
                            .to_tbl(release::Entity)
                            .to_col(release::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-package-release-name-version")
                    .table(package::Entity)
                    .col(package::Column::ReleaseId)
                    .col(package::Column::Name)
                    .col(package::Column::Version)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(template::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(template::Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(template::Column::ReleaseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(template::Column::Name).string().not_null())
                    .col(ColumnDef::new(template::Column::Version).string().not_null())
                    .col(
                        ColumnDef::new(template::Column::Fingerprint)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(template::Column::BlobstoreId).string())
                    .foreign_key(
                        ForeignKeyCreateStatement::new()
                            .name("fk_template_release")
                            .from_tbl(template::Entity)
                            .from_col(template::Column::ReleaseId)
                            .to_tbl(release::Entity)
                            .to_col(release::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(packages_release_versions::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(packages_release_versions::Column::PackageId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(packages_release_versions::Column::ReleaseVersionId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(packages_release_versions::Column::PackageId)
                            .col(packages_release_versions::Column::ReleaseVersionId),
                    )
                    .foreign_key(
                        ForeignKeyCreateStatement::new()
                            .name("fk_packages_release_versions_package")
                            .from_tbl(packages_release_versions::Entity)
                            .from_col(packages_release_versions::Column::PackageId)
                            .to_tbl(package::Entity)
                            .to_col(package::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKeyCreateStatement::new()
                            .name("fk_packages_release_versions_release_version")
                            .from_tbl(packages_release_versions::Entity)
                            .from_col(packages_release_versions::Column::ReleaseVersionId)
                            .to_tbl(release_version::Entity)
                            .to_col(release_version::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(templates_release_versions::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(templates_release_versions::Column::TemplateId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(templates_release_versions::Column::ReleaseVersionId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(templates_release_versions::Column::TemplateId)
                            .col(templates_release_versions::Column::ReleaseVersionId),
                    )
                    .foreign_key(
                        ForeignKeyCreateStatement::new()
                            .name("fk_templates_release_versions_template")
                            .from_tbl(templates_release_versions::Entity)
                            .from_col(templates_release_versions::Column::TemplateId)
                            .to_tbl(template::Entity)
                            .to_col(template::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKeyCreateStatement::new()
                            .name("fk_templates_release_versions_release_version")
                            .from_tbl(templates_release_versions::Entity)
                            .from_col(templates_release_versions::Column::ReleaseVersionId)
                            .to_tbl(release_version::Entity)
                            .to_col(release_version::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
