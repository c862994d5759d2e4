//! Blobstore.
//!
//! Blobs are addressed by the blobstore ID recorded in the catalog.

mod local;
mod s3;

use tokio::io::AsyncRead;

use crate::error::DirectorResult;

pub(crate) use self::local::{LocalBackend, LocalStorageConfig};
pub(crate) use self::s3::{S3Backend, S3StorageConfig};

/// A stream of blob content.
pub type Download = Box<dyn AsyncRead + Unpin + Send>;

/// A storage backend.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    /// Uploads a file.
    async fn upload_file(
        &self,
        name: String,
        stream: &mut (dyn AsyncRead + Unpin + Send),
    ) -> DirectorResult<()>;

    /// Downloads a file.
    async fn download_file(&self, name: String) -> DirectorResult<Download>;

    /// Deletes a file.
    ///
    /// Deleting a file that does not exist succeeds.
    async fn delete_file(&self, name: String) -> DirectorResult<()>;
}
