//! DriveRemoteStore - IRemoteStore implementation for Google Drive
//!
//! Thin adapter that fulfils the [`IRemoteStore`] port contract by
//! delegating to the [`crate::files`] operations.
//!
//! ## Design Notes
//!
//! - Authentication is handled separately by
//!   [`crate::auth::DriveAuthenticator`]; the store receives a client that
//!   already carries a valid access token.
//! - No retry is performed here; the upload engine isolates each file's
//!   failure into its own report.

use anyhow::Result;
use async_trait::async_trait;

use drivepush_core::domain::newtypes::FileId;
use drivepush_core::ports::remote_store::{IRemoteStore, ObjectMetadata, ObjectQuery, RemoteObject};

use crate::client::DriveClient;
use crate::files;

/// Remote store implementation that delegates to the Google Drive API
pub struct DriveRemoteStore {
    client: DriveClient,
}

impl DriveRemoteStore {
    /// Creates a new `DriveRemoteStore` wrapping the given [`DriveClient`]
    pub fn new(client: DriveClient) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying client
    pub fn client(&self) -> &DriveClient {
        &self.client
    }
}

#[async_trait]
impl IRemoteStore for DriveRemoteStore {
    async fn list(&self, query: &ObjectQuery) -> Result<Vec<RemoteObject>> {
        files::list_objects(&self.client, query).await
    }

    async fn create(
        &self,
        metadata: &ObjectMetadata,
        content: Option<&[u8]>,
    ) -> Result<RemoteObject> {
        files::create_object(&self.client, metadata, content).await
    }

    async fn update(
        &self,
        id: &FileId,
        metadata: &ObjectMetadata,
        content: Option<&[u8]>,
    ) -> Result<RemoteObject> {
        files::update_object(&self.client, id, metadata, content).await
    }

    async fn trash(&self, id: &FileId) -> Result<()> {
        files::trash_object(&self.client, id).await
    }
}
