//! External CPI executable.
//!
//! The executable is run once per call. It receives a JSON request on
//! stdin and writes a single JSON response to stdout:
//!
//! ```json
//! {"method": "delete_vm", "arguments": ["vm-1"], "context": {}}
//! {"result": null, "error": {"type": "Clouds::VMNotFound", "message": "...", "ok_to_retry": false}, "log": ""}
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{Cloud, CloudError};

/// External CPI configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalCpiConfig {
    /// Path to the CPI executable.
    pub path: PathBuf,

    /// Extra context sent with every call.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

/// An infrastructure provider backed by an external executable.
#[derive(Debug)]
pub struct ExternalCpi {
    config: ExternalCpiConfig,
}

#[derive(Debug, Serialize)]
struct CpiRequest<'a> {
    method: &'a str,
    arguments: Vec<&'a str>,
    context: &'a HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct CpiResponse {
    #[serde(default)]
    error: Option<CpiError>,

    #[serde(default)]
    log: String,
}

#[derive(Debug, Deserialize)]
struct CpiError {
    #[serde(rename = "type")]
    error_type: String,
    message: String,

    #[serde(default)]
    ok_to_retry: bool,
}

impl ExternalCpi {
    pub fn new(config: ExternalCpiConfig) -> Self {
        Self { config }
    }

    async fn invoke(&self, method: &str, kind: &'static str, cid: &str) -> Result<(), CloudError> {
        let request = CpiRequest {
            method,
            arguments: vec![cid],
            context: &self.config.context,
        };
        let payload = serde_json::to_vec(&request).map_err(|e| CloudError::Failed(e.into()))?;

        let mut child = Command::new(&self.config.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CloudError::Failed(e.into()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&payload)
                .await
                .map_err(|e| CloudError::Failed(e.into()))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| CloudError::Failed(e.into()))?;

        if !output.status.success() {
            return Err(CloudError::Failed(anyhow!(
                "CPI {} exited with {}",
                method,
                output.status
            )));
        }

        let response: CpiResponse =
            serde_json::from_slice(&output.stdout).map_err(|e| CloudError::Failed(e.into()))?;

        if !response.log.is_empty() {
            tracing::trace!("CPI {} log: {}", method, response.log);
        }

        match response.error {
            None => Ok(()),
            Some(error) => Err(classify(error, kind, cid)),
        }
    }
}

fn classify(error: CpiError, kind: &'static str, cid: &str) -> CloudError {
    if error.error_type.ends_with("NotFound") {
        CloudError::NotFound {
            kind,
            cid: cid.to_owned(),
        }
    } else {
        CloudError::Failed(anyhow!(
            "{}: {} (ok_to_retry: {})",
            error.error_type,
            error.message,
            error.ok_to_retry
        ))
    }
}

#[async_trait]
impl Cloud for ExternalCpi {
    async fn delete_vm(&self, cid: &str) -> Result<(), CloudError> {
        self.invoke("delete_vm", "VM", cid).await
    }

    async fn delete_disk(&self, cid: &str) -> Result<(), CloudError> {
        self.invoke("delete_disk", "Disk", cid).await
    }

    async fn delete_snapshot(&self, cid: &str) -> Result<(), CloudError> {
        self.invoke("delete_snapshot", "Snapshot", cid).await
    }

    async fn delete_stemcell(&self, cid: &str) -> Result<(), CloudError> {
        self.invoke("delete_stemcell", "Stemcell", cid).await
    }
}
