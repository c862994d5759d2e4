//! Error handling.

use std::error::Error as StdError;

use anyhow::Error as AnyError;
use displaydoc::Display;

use dockyard::error::DockyardError;

pub type DirectorResult<T> = Result<T, DirectorError>;

/// An error.
#[derive(Debug, Display)]
pub enum DirectorError {
    /// Release {name}/{version} is still in use by a deployment.
    ReleaseVersionInUse { name: String, version: String },

    /// Stemcell {name}/{version} is still in use by a deployment.
    StemcellInUse { name: String, version: String },

    /// Timed out acquiring lock "{resource}".
    LockTimeout { resource: String },

    /// Failed to delete {artifact}: {cause}
    DeletionError {
        artifact: String,
        cause: Box<DirectorError>,
    },

    /// Invalid cleanup policy: {reason}
    PolicyResolutionError { reason: String },

    /// Cleanup worker failed: {0}
    WorkerPoolError(AnyError),

    /// Database error: {0}
    DatabaseError(AnyError),

    /// Storage error: {0}
    StorageError(AnyError),

    /// Cloud error: {0}
    CloudError(AnyError),

    /// Metrics error: {0}
    MetricsError(AnyError),

    /// {0}
    DockyardError(DockyardError),
}

impl DirectorError {
    pub fn database_error(error: impl StdError + Send + Sync + 'static) -> Self {
        Self::DatabaseError(AnyError::new(error))
    }

    pub fn storage_error(error: impl StdError + Send + Sync + 'static) -> Self {
        Self::StorageError(AnyError::new(error))
    }

    pub fn cloud_error(error: impl StdError + Send + Sync + 'static) -> Self {
        Self::CloudError(AnyError::new(error))
    }

    pub fn metrics_error(error: impl StdError + Send + Sync + 'static) -> Self {
        Self::MetricsError(AnyError::new(error))
    }

    pub fn policy_error(reason: impl Into<String>) -> Self {
        Self::PolicyResolutionError {
            reason: reason.into(),
        }
    }

    /// Wraps an error that happened while deleting one artifact.
    pub fn deletion_error(artifact: impl Into<String>, cause: DirectorError) -> Self {
        Self::DeletionError {
            artifact: artifact.into(),
            cause: Box::new(cause),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ReleaseVersionInUse { .. } => "ReleaseVersionInUse",
            Self::StemcellInUse { .. } => "StemcellInUse",
            Self::LockTimeout { .. } => "LockTimeout",
            Self::DeletionError { .. } => "DeletionError",
            Self::PolicyResolutionError { .. } => "PolicyResolutionError",
            Self::WorkerPoolError(_) => "WorkerPoolError",
            Self::DatabaseError(_) => "DatabaseError",
            Self::StorageError(_) => "StorageError",
            Self::CloudError(_) => "CloudError",
            Self::MetricsError(_) => "MetricsError",
            Self::DockyardError(e) => e.name(),
        }
    }
}

impl StdError for DirectorError {}

impl From<DockyardError> for DirectorError {
    fn from(error: DockyardError) -> Self {
        Self::DockyardError(error)
    }
}
