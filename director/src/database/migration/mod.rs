//! Database migrations.

pub use sea_orm_migration::*;

mod m20240301_000001_create_release_tables;
mod m20240301_000002_create_stemcell_tables;
mod m20240301_000003_create_deployment_tables;
mod m20240301_000004_create_orphan_tables;
mod m20240301_000005_create_blob_tables;
mod m20240315_000001_add_lock_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_release_tables::Migration),
            Box::new(m20240301_000002_create_stemcell_tables::Migration),
            Box::new(m20240301_000003_create_deployment_tables::Migration),
            Box::new(m20240301_000004_create_orphan_tables::Migration),
            Box::new(m20240301_000005_create_blob_tables::Migration),
            Box::new(m20240315_000001_add_lock_table::Migration),
        ]
    }
}
