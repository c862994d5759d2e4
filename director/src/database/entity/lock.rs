//! A named lock shared between director processes.

use sea_orm::entity::prelude::*;

pub type LockModel = Model;

/// A held lock.
///
/// A lock whose `expired_at` is in the past is abandoned and may be
/// taken over.
#[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "lock")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Name of the locked resource.
    #[sea_orm(unique)]
    pub name: String,

    /// Random ID of the holder.
    pub uid: String,

    /// Timestamp after which the lock is considered abandoned.
    pub expired_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
