#![deny(
    asm_sub_register,
    deprecated,
    missing_abi,
    unsafe_code,
    unused_macros,
    unused_must_use,
    unused_unsafe
)]
#![deny(clippy::from_over_into, clippy::needless_question_mark)]
#![cfg_attr(
    not(debug_assertions),
    deny(unused_imports, unused_mut, unused_variables,)
)]

pub mod cleanup;
pub mod cloud;
pub mod config;
pub mod database;
pub mod error;
pub mod event_log;
pub mod lock;
pub mod metrics;
mod storage;

#[cfg(test)]
mod testing;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sea_orm::{query::Statement, ConnectionTrait, Database, DatabaseConnection};
use tokio::sync::OnceCell;
use tokio::time;

use cloud::{Cloud, ExternalCpi};
use config::{CloudConfig, Config, StorageConfig};
use database::migration::{Migrator, MigratorTrait};
use error::{DirectorError, DirectorResult};
use metrics::MetricsCollector;
use storage::{LocalBackend, S3Backend, StorageBackend};

type State = Arc<StateInner>;

/// Global director state.
#[derive(Debug)]
pub struct StateInner {
    /// The Dockyard Director configuration.
    config: Config,

    /// Handle to the database.
    database: OnceCell<DatabaseConnection>,

    /// Handle to the storage backend.
    storage: OnceCell<Arc<dyn StorageBackend>>,

    /// Metrics sink shared by all passes.
    metrics: Arc<MetricsCollector>,
}

impl StateInner {
    async fn new(config: Config) -> DirectorResult<State> {
        let metrics = Arc::new(MetricsCollector::new()?);
        if config.metrics.enabled {
            metrics.enable();
        }

        Ok(Arc::new(Self {
            config,
            database: OnceCell::new(),
            storage: OnceCell::new(),
            metrics,
        }))
    }

    /// Returns a handle to the database.
    async fn database(&self) -> DirectorResult<&DatabaseConnection> {
        self.database
            .get_or_try_init(|| async {
                Database::connect(&self.config.database.url)
                    .await
                    .map_err(DirectorError::database_error)
            })
            .await
    }

    /// Returns a handle to the storage backend.
    async fn storage(&self) -> DirectorResult<&Arc<dyn StorageBackend>> {
        self.storage
            .get_or_try_init(|| async {
                match &self.config.storage {
                    StorageConfig::Local(local_config) => {
                        let local = LocalBackend::new(local_config.clone()).await?;
                        let backend: Arc<dyn StorageBackend> = Arc::new(local);
                        Ok(backend)
                    }
                    StorageConfig::S3(s3_config) => {
                        let s3 = S3Backend::new(s3_config.clone()).await?;
                        let backend: Arc<dyn StorageBackend> = Arc::new(s3);
                        Ok(backend)
                    }
                }
            })
            .await
    }

    /// Returns a handle to the infrastructure provider.
    fn cloud(&self) -> Arc<dyn Cloud> {
        match &self.config.cloud {
            CloudConfig::External(cpi_config) => Arc::new(ExternalCpi::new(cpi_config.clone())),
        }
    }

    /// Sends periodic heartbeat queries to the database.
    async fn run_db_heartbeat(&self) -> DirectorResult<()> {
        let db = self.database().await?;
        let stmt =
            Statement::from_string(db.get_database_backend(), "SELECT 'heartbeat';".to_string());

        loop {
            let _ = db.execute(stmt.clone()).await;
            time::sleep(Duration::from_secs(60)).await;
        }
    }
}

/// Runs the director with scheduled cleanup.
pub async fn run_director(config: Config) -> Result<()> {
    eprintln!("Starting director...");

    let state = StateInner::new(config.clone()).await?;

    tokio::join!(cleanup::run_cleanup(config), async {
        if state.config.database.heartbeat {
            let _ = state.run_db_heartbeat().await;
        }
    });

    Ok(())
}

/// Runs database migrations.
pub async fn run_migrations(config: Config) -> Result<()> {
    eprintln!("Running migrations...");

    let state = StateInner::new(config).await?;
    let db = state.database().await?;
    Migrator::up(db, None).await?;

    Ok(())
}
