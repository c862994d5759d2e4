//! S3 remote files.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::Builder as S3ConfigBuilder,
    config::{Credentials, Region},
    primitives::ByteStream,
    Client,
};
use serde::Deserialize;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::{Download, StorageBackend};
use crate::error::{DirectorError, DirectorResult};

/// The S3 remote file storage backend.
#[derive(Debug)]
pub struct S3Backend {
    client: Client,
    config: S3StorageConfig,
}

/// S3 remote file storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct S3StorageConfig {
    /// The AWS region.
    region: String,

    /// The name of the bucket.
    bucket: String,

    /// Custom S3 endpoint.
    ///
    /// Set this if you are using an S3-compatible object storage (e.g., Minio).
    endpoint: Option<String>,

    /// S3 credentials.
    ///
    /// If not specified, it's read from the `AWS_ACCESS_KEY_ID` and
    /// `AWS_SECRET_ACCESS_KEY` environment variables.
    credentials: Option<S3CredentialsConfig>,
}

/// S3 credential configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct S3CredentialsConfig {
    /// Access key ID.
    access_key_id: String,

    /// Secret access key.
    secret_access_key: String,
}

impl S3Backend {
    pub async fn new(config: S3StorageConfig) -> DirectorResult<Self> {
        let s3_config = Self::config_builder(&config)
            .await
            .region(Region::new(config.region.to_owned()))
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
            config,
        })
    }

    async fn config_builder(config: &S3StorageConfig) -> S3ConfigBuilder {
        let shared_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let mut builder = S3ConfigBuilder::from(&shared_config);

        if let Some(credentials) = &config.credentials {
            builder = builder.credentials_provider(Credentials::new(
                &credentials.access_key_id,
                &credentials.secret_access_key,
                None,
                None,
                "s3",
            ));
        }

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        builder
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    async fn upload_file(
        &self,
        name: String,
        stream: &mut (dyn AsyncRead + Unpin + Send),
    ) -> DirectorResult<()> {
        // Blobs handled here are release tarballs and DNS records, so a
        // single PutObject is enough
        let mut body = Vec::new();
        stream
            .read_to_end(&mut body)
            .await
            .map_err(DirectorError::storage_error)?;

        let put_object = self
            .client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&name)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(DirectorError::storage_error)?;

        tracing::debug!("put_object -> {:#?}", put_object);

        Ok(())
    }

    async fn download_file(&self, name: String) -> DirectorResult<Download> {
        let output = self
            .client
            .get_object()
            .bucket(&self.config.bucket)
            .key(&name)
            .send()
            .await
            .map_err(DirectorError::storage_error)?;

        Ok(Box::new(Box::pin(output.body.into_async_read())))
    }

    async fn delete_file(&self, name: String) -> DirectorResult<()> {
        // DeleteObject succeeds for keys that do not exist
        let deletion = self
            .client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(&name)
            .send()
            .await
            .map_err(DirectorError::storage_error)?;

        tracing::debug!("delete_file -> {:#?}", deletion);

        Ok(())
    }
}
