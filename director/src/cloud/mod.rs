//! Infrastructure control plane.
//!
//! Every call deprovisions exactly one resource. A resource that is
//! already gone is reported as [`CloudError::NotFound`], which callers
//! treat as success.

mod external;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use displaydoc::Display;
use tokio::time;

use crate::error::{DirectorError, DirectorResult};

pub(crate) use self::external::{ExternalCpi, ExternalCpiConfig};

/// An infrastructure provider.
#[async_trait]
pub trait Cloud: Send + Sync + std::fmt::Debug {
    /// Deletes a VM.
    async fn delete_vm(&self, cid: &str) -> Result<(), CloudError>;

    /// Deletes a persistent disk.
    async fn delete_disk(&self, cid: &str) -> Result<(), CloudError>;

    /// Deletes a disk snapshot.
    async fn delete_snapshot(&self, cid: &str) -> Result<(), CloudError>;

    /// Deletes an uploaded stemcell image.
    async fn delete_stemcell(&self, cid: &str) -> Result<(), CloudError>;
}

/// An error from the infrastructure provider.
#[derive(Debug, Display)]
pub enum CloudError {
    /// {kind} "{cid}" was not found.
    NotFound { kind: &'static str, cid: String },

    /// Call did not complete within {0:?}.
    Timeout(Duration),

    /// CPI error: {0}
    Failed(anyhow::Error),
}

impl std::error::Error for CloudError {}

/// Runs a deprovision call, giving up after `timeout`.
///
/// The call is dropped on expiry, which also kills an external CPI
/// process still running it.
pub async fn bounded<F>(timeout: Duration, call: F) -> Result<(), CloudError>
where
    F: Future<Output = Result<(), CloudError>>,
{
    time::timeout(timeout, call)
        .await
        .unwrap_or(Err(CloudError::Timeout(timeout)))
}

/// Converts the result of a deprovision call, treating "not found" as done.
pub fn tolerate_not_found(result: Result<(), CloudError>) -> DirectorResult<()> {
    match result {
        Ok(()) => Ok(()),
        Err(CloudError::NotFound { kind, cid }) => {
            tracing::debug!("{} {} not found in IaaS, treating as deleted", kind, cid);
            Ok(())
        }
        Err(e) => Err(DirectorError::cloud_error(e)),
    }
}
