//! Named resource locks.
//!
//! Locks serialize operations on a shared resource such as a release
//! name. Acquisition is bounded by a timeout, after which the caller
//! gets [`DirectorError::LockTimeout`] and is expected to skip the
//! resource.

mod database;
mod memory;

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::DirectorResult;

pub use self::database::DatabaseLocks;
pub use self::memory::MemoryLocks;

#[cfg(test)]
use crate::error::DirectorError;

/// A set of named locks.
#[async_trait]
pub trait ResourceLocks: Send + Sync + Debug {
    /// Acquires a lock, waiting at most `timeout`.
    ///
    /// The lock is held until the returned guard is dropped.
    async fn acquire(&self, name: &str, timeout: Duration) -> DirectorResult<LockGuard>;
}

/// A held lock.
pub struct LockGuard {
    name: String,
    _held: Box<dyn Send + Sync>,
}

impl LockGuard {
    fn new(name: &str, held: impl Send + Sync + 'static) -> Self {
        Self {
            name: name.to_owned(),
            _held: Box::new(held),
        }
    }

    /// Returns the name of the lock.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Debug for LockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard").field("name", &self.name).finish()
    }
}

/// Returns the name of the lock protecting a release.
pub fn release_lock_name(release: &str) -> String {
    format!("lock:release:{}", release)
}

/// Returns the name of the lock protecting the disposal of an orphaned VM.
pub fn orphaned_vm_lock_name(cid: &str) -> String {
    format!("lock:orphan_vm_cleanup:{}", cid)
}

#[cfg(test)]
async fn check_mutual_exclusion(locks: &dyn ResourceLocks) {
    let timeout = Duration::from_millis(100);

    let held = locks.acquire("lock:release:r1", timeout).await.unwrap();
    assert_eq!("lock:release:r1", held.name());

    // Another name is independent
    let other = locks.acquire("lock:release:r2", timeout).await.unwrap();

    let err = locks.acquire("lock:release:r1", timeout).await.unwrap_err();
    assert!(matches!(err, DirectorError::LockTimeout { .. }));

    drop(held);
    drop(other);
}
