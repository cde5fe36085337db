//! Domain error types
//!
//! `DomainError` covers validation failures when constructing domain
//! newtypes. `UploadError` is the per-file failure taxonomy surfaced in
//! upload reports: local filesystem faults and remote service faults are
//! kept distinct because they have different recovery recommendations
//! (retry the file vs. re-authenticate / check connectivity).

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid remote object identifier
    #[error("Invalid remote id: {0}")]
    InvalidId(String),

    /// Invalid file name (empty or containing a path separator)
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    /// A `modified` property value that is not an integer timestamp
    #[error("Invalid modified stamp: {0}")]
    InvalidStamp(String),
}

/// Per-file failure classification for upload reports
///
/// Skip reasons (remote newer, same stamp, missing property) are *not*
/// errors; they are normal outcomes and live in [`crate::domain::Outcome`].
/// Serializes into the JSON batch report.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum UploadError {
    /// Local path missing or unreadable; isolated per file, the batch continues
    #[error("Local file error: {0}")]
    Local(String),

    /// Backend call failure (auth, network, quota); fatal for this file's operation
    #[error("Remote service error: {0}")]
    Remote(String),
}

impl UploadError {
    /// Wraps an adapter-level error from the local filesystem port
    pub fn local(err: &anyhow::Error) -> Self {
        Self::Local(format!("{err:#}"))
    }

    /// Wraps an adapter-level error from the remote store port
    pub fn remote(err: &anyhow::Error) -> Self {
        Self::Remote(format!("{err:#}"))
    }
}
