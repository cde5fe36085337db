//! Local file reader port (driven/secondary port)
//!
//! The core only ever needs two things from the local filesystem: a file's
//! modification time and its bytes. Uses `anyhow::Result` because
//! filesystem errors are adapter-specific.

use std::path::Path;

/// Port trait for local filesystem reads
///
/// Implementations must truncate (not round) the modification time to
/// whole seconds, because the remote `modified` property stores truncated
/// Unix seconds and comparisons are strict integer ordering.
#[async_trait::async_trait]
pub trait ILocalFiles: Send + Sync {
    /// Returns the file's modification time as truncated Unix seconds
    ///
    /// # Errors
    /// Returns an error if the path doesn't exist or cannot be stat-ed.
    async fn mtime_seconds(&self, path: &Path) -> anyhow::Result<i64>;

    /// Reads the entire contents of the file
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be read.
    async fn read(&self, path: &Path) -> anyhow::Result<Vec<u8>>;
}
