//! Local filesystem adapter backed by tokio::fs
//!
//! Implements the core's [`ILocalFiles`] port. Modification times are
//! truncated to whole Unix seconds, matching the resolution of the remote
//! `modified` property.

use std::path::Path;
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use async_trait::async_trait;

use drivepush_core::ports::ILocalFiles;

/// [`ILocalFiles`] implementation reading from the real filesystem
pub struct TokioLocalFiles;

#[async_trait]
impl ILocalFiles for TokioLocalFiles {
    async fn mtime_seconds(&self, path: &Path) -> Result<i64> {
        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        let modified = metadata
            .modified()
            .with_context(|| format!("No modification time for {}", path.display()))?;
        let secs = modified
            .duration_since(UNIX_EPOCH)
            .context("File modification time predates the Unix epoch")?
            .as_secs();
        Ok(secs as i64)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}
