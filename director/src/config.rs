//! Director configuration.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use derivative::Derivative;
use serde::Deserialize;
use xdg::BaseDirectories;

use crate::cloud::ExternalCpiConfig;
use crate::storage::{LocalStorageConfig, S3StorageConfig};

/// Application prefix in XDG base directories.
///
/// This will be concatenated into `$XDG_CONFIG_HOME/dockyard`.
const XDG_PREFIX: &str = "dockyard";

/// Environment variable holding an inline configuration.
pub const ENV_CONFIG: &str = "DOCKYARD_DIRECTOR_CONFIG";

/// Configuration for the Dockyard Director.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection.
    pub database: DatabaseConfig,

    /// Blob storage.
    pub storage: StorageConfig,

    /// Infrastructure provider.
    pub cloud: CloudConfig,

    /// Artifact cleanup.
    #[serde(default = "Default::default")]
    pub cleanup: CleanupConfig,

    /// Metrics.
    #[serde(default = "Default::default")]
    pub metrics: MetricsConfig,
}

/// Database connection configuration.
#[derive(Clone, Derivative, Deserialize)]
#[derivative(Debug)]
pub struct DatabaseConfig {
    /// Connection URL.
    ///
    /// The URL may carry credentials.
    #[derivative(Debug = "ignore")]
    pub url: String,

    /// Whether to enable sending of periodic heartbeat queries.
    ///
    /// If enabled, a heartbeat query will be sent every minute.
    #[serde(default = "default_db_heartbeat")]
    pub heartbeat: bool,
}

/// Blob storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum StorageConfig {
    /// Local file storage.
    #[serde(rename = "local")]
    Local(LocalStorageConfig),

    /// S3 storage.
    #[serde(rename = "s3")]
    S3(S3StorageConfig),
}

/// Infrastructure provider configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum CloudConfig {
    /// An external CPI executable.
    #[serde(rename = "external")]
    External(ExternalCpiConfig),
}

/// Artifact cleanup configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CleanupConfig {
    /// The frequency to run a conservative cleanup at.
    ///
    /// If zero, scheduled cleanup is disabled, but it can still be run
    /// manually with `dockyardd --mode cleanup-once`.
    #[serde(with = "humantime_serde", default = "default_cleanup_interval")]
    pub interval: Duration,

    /// Number of artifacts deleted concurrently.
    #[serde(rename = "max-threads")]
    #[serde(default = "default_max_threads")]
    pub max_threads: usize,

    /// How long to wait for the lock on a release.
    ///
    /// Releases whose lock cannot be acquired in time are skipped
    /// until the next pass.
    #[serde(rename = "release-lock-timeout")]
    #[serde(with = "humantime_serde", default = "default_lock_timeout")]
    pub release_lock_timeout: Duration,

    /// How long to wait for the infrastructure to dispose of a VM.
    #[serde(rename = "vm-disposal-timeout")]
    #[serde(with = "humantime_serde", default = "default_lock_timeout")]
    pub vm_disposal_timeout: Duration,

    /// How long to wait for any other infrastructure call.
    ///
    /// Applies to deleting disks, snapshots and stemcell images.
    #[serde(rename = "cloud-call-timeout")]
    #[serde(with = "humantime_serde", default = "default_cloud_call_timeout")]
    pub cloud_call_timeout: Duration,

    /// How long a lock held by a crashed process stays in place.
    #[serde(rename = "lock-expiration")]
    #[serde(with = "humantime_serde", default = "default_lock_expiration")]
    pub lock_expiration: Duration,

    /// Number of versions of each release kept by a conservative pass.
    #[serde(rename = "releases-to-keep")]
    #[serde(default = "default_versions_to_keep")]
    pub releases_to_keep: usize,

    /// Number of versions of each stemcell kept by a conservative pass.
    #[serde(rename = "stemcells-to-keep")]
    #[serde(default = "default_versions_to_keep")]
    pub stemcells_to_keep: usize,

    /// Minimum age of a DNS blob before a conservative pass deletes it.
    #[serde(rename = "dns-blob-max-age")]
    #[serde(with = "humantime_serde", default = "default_dns_blob_max_age")]
    pub dns_blob_max_age: Duration,

    /// Number of recent DNS blobs kept by a conservative pass.
    #[serde(rename = "dns-blobs-to-keep")]
    #[serde(default = "default_dns_blobs_to_keep")]
    pub dns_blobs_to_keep: usize,
}

/// Metrics configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    /// Whether to collect metrics.
    #[serde(default)]
    pub enabled: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval: default_cleanup_interval(),
            max_threads: default_max_threads(),
            release_lock_timeout: default_lock_timeout(),
            vm_disposal_timeout: default_lock_timeout(),
            cloud_call_timeout: default_cloud_call_timeout(),
            lock_expiration: default_lock_expiration(),
            releases_to_keep: default_versions_to_keep(),
            stemcells_to_keep: default_versions_to_keep(),
            dns_blob_max_age: default_dns_blob_max_age(),
            dns_blobs_to_keep: default_dns_blobs_to_keep(),
        }
    }
}

fn default_db_heartbeat() -> bool {
    false
}

fn default_cleanup_interval() -> Duration {
    Duration::from_secs(43200)
}

fn default_max_threads() -> usize {
    32
}

fn default_cloud_call_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_lock_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_lock_expiration() -> Duration {
    Duration::from_secs(60)
}

fn default_versions_to_keep() -> usize {
    2
}

fn default_dns_blob_max_age() -> Duration {
    Duration::from_secs(3600)
}

fn default_dns_blobs_to_keep() -> usize {
    10
}

/// Loads the configuration.
///
/// An explicit path takes precedence over the inline configuration in
/// `DOCKYARD_DIRECTOR_CONFIG`, which takes precedence over the XDG
/// configuration file.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return load_config_from_path(path);
    }

    if let Ok(s) = env::var(ENV_CONFIG) {
        return load_config_from_str(&s);
    }

    let path = get_xdg_config_path()?;
    if !path.exists() {
        return Err(anyhow!(
            "No configuration found. Pass --config, set {} or create {:?}",
            ENV_CONFIG,
            path
        ));
    }

    load_config_from_path(&path)
}

pub fn load_config_from_path(path: &Path) -> Result<Config> {
    tracing::info!("Using configurations: {:?}", path);

    let config = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {:?}", path))?;
    toml::from_str(&config).context("Invalid configuration file")
}

pub fn load_config_from_str(s: &str) -> Result<Config> {
    tracing::info!("Using configurations from environment variable");
    toml::from_str(s).context("Invalid configuration")
}

pub fn get_xdg_config_path() -> Result<PathBuf> {
    let xdg_dirs = BaseDirectories::with_prefix(XDG_PREFIX)?;
    let config_path = xdg_dirs.get_config_file("director.toml");

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [database]
        url = "sqlite:///tmp/director.db"

        [storage]
        type = "local"
        path = "/tmp/blobs"

        [cloud]
        type = "external"
        path = "/var/vcap/jobs/cpi/bin/cpi"
    "#;

    #[test]
    fn test_defaults() {
        let config = load_config_from_str(MINIMAL).unwrap();

        assert!(!config.database.heartbeat);
        assert!(!config.metrics.enabled);
        assert_eq!(Duration::from_secs(43200), config.cleanup.interval);
        assert_eq!(32, config.cleanup.max_threads);
        assert_eq!(2, config.cleanup.releases_to_keep);
        assert_eq!(10, config.cleanup.dns_blobs_to_keep);
        assert_eq!(Duration::from_secs(3600), config.cleanup.dns_blob_max_age);
        assert_eq!(Duration::from_secs(600), config.cleanup.cloud_call_timeout);

        let CloudConfig::External(cpi) = config.cloud;
        assert!(cpi.context.is_empty());
    }

    #[test]
    fn test_cleanup_section() {
        let s = format!(
            r#"{}
            [cleanup]
            interval = "0s"
            max-threads = 4
            release-lock-timeout = "2s"
            cloud-call-timeout = "1m"
            releases-to-keep = 5

            [metrics]
            enabled = true
            "#,
            MINIMAL
        );
        let config = load_config_from_str(&s).unwrap();

        assert_eq!(Duration::ZERO, config.cleanup.interval);
        assert_eq!(4, config.cleanup.max_threads);
        assert_eq!(Duration::from_secs(2), config.cleanup.release_lock_timeout);
        assert_eq!(Duration::from_secs(60), config.cleanup.cloud_call_timeout);
        assert_eq!(5, config.cleanup.releases_to_keep);
        assert_eq!(2, config.cleanup.stemcells_to_keep);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_unknown_field() {
        let s = format!("{}\nlisten = \"[::]:8080\"\n", MINIMAL);
        assert!(load_config_from_str(&s).is_err());
    }

    #[test]
    fn test_database_url_hidden() {
        let config = load_config_from_str(MINIMAL).unwrap();
        assert!(!format!("{:?}", config.database).contains("director.db"));
    }
}
