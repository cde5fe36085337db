//! Remote folder resolution use case
//!
//! Finds or creates the remote folder a batch uploads into. Resolution is
//! idempotent: repeated calls with the same name return the same id and
//! create at most one folder object.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::domain::newtypes::FolderId;
use crate::ports::remote_store::{IRemoteStore, ObjectMetadata, ObjectQuery};

/// Use case for resolving a folder name to its remote identifier
pub struct ResolveFolderUseCase {
    remote: Arc<dyn IRemoteStore>,
}

impl ResolveFolderUseCase {
    pub fn new(remote: Arc<dyn IRemoteStore>) -> Self {
        Self { remote }
    }

    /// Resolves `name` to a folder id, creating the folder if absent
    ///
    /// The root sentinel is returned unchanged without a remote call. When
    /// duplicate same-named folders exist the lowest id wins, so repeated
    /// runs always land in the same folder.
    ///
    /// # Errors
    ///
    /// Any backend failure propagates; folder resolution is fatal for the
    /// current run.
    pub async fn resolve(&self, name: &str) -> Result<FolderId> {
        if FolderId::is_root_name(name) {
            debug!("Target folder is the root sentinel, no lookup needed");
            return Ok(FolderId::root());
        }

        let mut folders = self
            .remote
            .list(&ObjectQuery::folder(name))
            .await
            .with_context(|| format!("Failed to look up folder '{name}'"))?;

        if folders.is_empty() {
            let created = self
                .remote
                .create(&ObjectMetadata::folder(name), None)
                .await
                .with_context(|| format!("Failed to create folder '{name}'"))?;
            info!(folder = name, id = %created.id, "Created remote folder");
            return FolderId::new(created.id)
                .context("Backend returned an empty id for the created folder");
        }

        // The backend guarantees no ordering; sort so the pick is deterministic.
        folders.sort_by(|a, b| a.id.cmp(&b.id));
        if folders.len() > 1 {
            warn!(
                folder = name,
                count = folders.len(),
                "Multiple folders share this name; using the lowest id"
            );
        }

        let id = folders.remove(0).id;
        debug!(folder = name, id = %id, "Resolved existing remote folder");
        FolderId::new(id).context("Backend returned an empty folder id")
    }
}
