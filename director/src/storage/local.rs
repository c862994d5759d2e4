//! Local file storage.

use std::io::ErrorKind as IoErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs::{self, File};
use tokio::io::{self, AsyncRead};

use super::{Download, StorageBackend};
use crate::error::{DirectorError, DirectorResult};

#[derive(Debug)]
pub struct LocalBackend {
    config: LocalStorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalStorageConfig {
    /// The directory to store all files under.
    path: PathBuf,
}

impl LocalBackend {
    pub async fn new(config: LocalStorageConfig) -> DirectorResult<Self> {
        fs::create_dir_all(&config.path)
            .await
            .map_err(DirectorError::storage_error)?;

        Ok(Self { config })
    }

    fn get_path(&self, p: &str) -> PathBuf {
        self.config.path.join(p)
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    async fn upload_file(
        &self,
        name: String,
        mut stream: &mut (dyn AsyncRead + Unpin + Send),
    ) -> DirectorResult<()> {
        let mut file = File::create(self.get_path(&name))
            .await
            .map_err(DirectorError::storage_error)?;

        io::copy(&mut stream, &mut file)
            .await
            .map_err(DirectorError::storage_error)?;

        Ok(())
    }

    async fn download_file(&self, name: String) -> DirectorResult<Download> {
        let file = File::open(self.get_path(&name))
            .await
            .map_err(DirectorError::storage_error)?;

        Ok(Box::new(file))
    }

    async fn delete_file(&self, name: String) -> DirectorResult<()> {
        match fs::remove_file(self.get_path(&name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                tracing::debug!("Blob {} is already gone", name);
                Ok(())
            }
            Err(e) => Err(DirectorError::storage_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::env;

    use tokio::io::AsyncReadExt;
    use tokio_test::assert_ok;

    async fn backend(name: &str) -> LocalBackend {
        let path = env::temp_dir().join(format!("dockyard-local-{}-{}", name, std::process::id()));
        LocalBackend::new(LocalStorageConfig { path }).await.unwrap()
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let backend = backend("roundtrip").await;

        let mut content: &[u8] = b"release tarball";
        backend
            .upload_file("b1".to_string(), &mut content)
            .await
            .unwrap();

        let mut download = backend.download_file("b1".to_string()).await.unwrap();
        let mut buf = Vec::new();
        download.read_to_end(&mut buf).await.unwrap();
        assert_eq!(b"release tarball".as_slice(), buf.as_slice());

        assert_ok!(backend.delete_file("b1".to_string()).await);
        assert!(backend.download_file("b1".to_string()).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_absent_is_ok() {
        let backend = backend("absent").await;

        assert_ok!(backend.delete_file("never-uploaded".to_string()).await);
        assert_ok!(backend.delete_file("never-uploaded".to_string()).await);
    }
}
