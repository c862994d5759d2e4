//! Locks stored in the catalog.
//!
//! Each held lock is a row in the `lock` table. The holder keeps
//! pushing `expired_at` forward while it runs, so a lock left behind
//! by a crashed process becomes available again once it expires.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ActiveValue::Set, DatabaseConnection};
use tokio::task::{self, JoinHandle};
use tokio::time::{self, Instant};
use uuid::Uuid;

use super::{LockGuard, ResourceLocks};
use crate::database::entity::lock::{self, Entity as Lock};
use crate::error::{DirectorError, DirectorResult};

/// Interval between acquisition attempts.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Locks shared between all processes using the same catalog.
#[derive(Debug, Clone)]
pub struct DatabaseLocks {
    database: DatabaseConnection,

    /// How long a lock survives without being refreshed.
    expiration: Duration,
}

struct DatabaseLockGuard {
    database: DatabaseConnection,
    name: String,
    uid: String,
    refresh: JoinHandle<()>,
}

impl DatabaseLocks {
    pub fn new(database: DatabaseConnection, expiration: Duration) -> Self {
        Self {
            database,
            expiration,
        }
    }

    fn expiry(&self) -> ChronoDateTimeUtc {
        Utc::now() + chrono_duration(self.expiration)
    }

    /// Makes one attempt at taking a lock.
    async fn try_acquire(&self, name: &str, uid: &str) -> DirectorResult<bool> {
        // Abandoned locks can be taken over
        Lock::delete_many()
            .filter(lock::Column::Name.eq(name))
            .filter(lock::Column::ExpiredAt.lt(Utc::now()))
            .exec(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        let model = lock::ActiveModel {
            name: Set(name.to_owned()),
            uid: Set(uid.to_owned()),
            expired_at: Set(self.expiry()),
            ..Default::default()
        };

        let inserted = Lock::insert(model)
            .on_conflict(
                OnConflict::column(lock::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.database)
            .await
            .map_err(DirectorError::database_error)?;

        Ok(inserted > 0)
    }

    fn spawn_refresh(&self, name: String, uid: String) -> JoinHandle<()> {
        let database = self.database.clone();
        let expiration = self.expiration;

        task::spawn(async move {
            loop {
                time::sleep(expiration / 2).await;

                let expired_at = Utc::now() + chrono_duration(expiration);
                let update = Lock::update_many()
                    .col_expr(lock::Column::ExpiredAt, Expr::value(expired_at))
                    .filter(lock::Column::Name.eq(name.as_str()))
                    .filter(lock::Column::Uid.eq(uid.as_str()))
                    .exec(&database)
                    .await;

                match update {
                    Ok(result) if result.rows_affected == 0 => {
                        tracing::warn!("Lock {} was taken over by another holder", name);
                        return;
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Failed to refresh lock {}: {}", name, e),
                }
            }
        })
    }
}

#[async_trait]
impl ResourceLocks for DatabaseLocks {
    async fn acquire(&self, name: &str, timeout: Duration) -> DirectorResult<LockGuard> {
        let uid = Uuid::new_v4().to_string();
        let deadline = Instant::now() + timeout;

        loop {
            if self.try_acquire(name, &uid).await? {
                break;
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(DirectorError::LockTimeout {
                    resource: name.to_owned(),
                });
            }

            time::sleep(POLL_INTERVAL.min(deadline - now)).await;
        }

        tracing::debug!("Acquired lock {} ({})", name, uid);

        let refresh = self.spawn_refresh(name.to_owned(), uid.clone());
        let guard = DatabaseLockGuard {
            database: self.database.clone(),
            name: name.to_owned(),
            uid,
            refresh,
        };

        Ok(LockGuard::new(name, guard))
    }
}

impl Drop for DatabaseLockGuard {
    fn drop(&mut self) {
        self.refresh.abort();

        let database = self.database.clone();
        let name = self.name.clone();
        let uid = self.uid.clone();

        task::spawn(async move {
            tracing::debug!("Releasing lock {}", name);

            let deletion = Lock::delete_many()
                .filter(lock::Column::Name.eq(name.as_str()))
                .filter(lock::Column::Uid.eq(uid.as_str()))
                .exec(&database)
                .await;

            if let Err(e) = deletion {
                tracing::warn!("Failed to release lock {}: {}", name, e);
            }
        });
    }
}

fn chrono_duration(duration: Duration) -> ChronoDuration {
    ChronoDuration::milliseconds(duration.as_millis().min(i64::MAX as u128) as i64)
}
