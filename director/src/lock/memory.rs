//! In-process locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time;

use super::{LockGuard, ResourceLocks};
use crate::error::{DirectorError, DirectorResult};

/// Locks that are only visible within this process.
#[derive(Debug, Default)]
pub struct MemoryLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl MemoryLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, name: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(name.to_owned()).or_default().clone()
    }
}

#[async_trait]
impl ResourceLocks for MemoryLocks {
    async fn acquire(&self, name: &str, timeout: Duration) -> DirectorResult<LockGuard> {
        let lock = self.get(name);

        match time::timeout(timeout, lock.lock_owned()).await {
            Ok(held) => {
                tracing::debug!("Acquired lock {}", name);
                Ok(LockGuard::new(name, held))
            }
            Err(_) => Err(DirectorError::LockTimeout {
                resource: name.to_owned(),
            }),
        }
    }
}
