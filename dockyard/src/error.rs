//! Error handling.

use std::error::Error as StdError;

use displaydoc::Display;

pub type DockyardResult<T> = Result<T, DockyardError>;

/// An error.
#[derive(Debug, Display)]
pub enum DockyardError {
    /// Invalid version "{version}": {reason}
    InvalidVersion {
        version: String,
        reason: &'static str,
    },
}

impl DockyardError {
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidVersion { .. } => "InvalidVersion",
        }
    }
}

impl StdError for DockyardError {}
