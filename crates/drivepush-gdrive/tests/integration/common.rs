//! Shared test helpers for Drive API integration tests
//!
//! Provides wiremock-based mock server setup for Drive v3 endpoints and a
//! fixed-clock local filesystem stub for driving the upload engine.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use drivepush_core::ports::ILocalFiles;
use drivepush_gdrive::client::DriveClient;

/// Starts a mock server and returns it with a client pointed at it
pub async fn setup_drive_mock() -> (MockServer, DriveClient) {
    let server = MockServer::start().await;
    let client = DriveClient::with_base_url("test-access-token", server.uri());
    (server, client)
}

/// JSON for one Drive file resource, optionally carrying the modified stamp
pub fn drive_file_json(id: &str, name: &str, modified: Option<i64>) -> serde_json::Value {
    let mut file = serde_json::json!({
        "id": id,
        "name": name,
        "mimeType": "application/octet-stream"
    });
    if let Some(secs) = modified {
        file["properties"] = serde_json::json!({ "modified": secs.to_string() });
    }
    file
}

/// Mounts `GET /files` for one exact `q` expression
pub async fn mount_search(server: &MockServer, q: &str, files: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", q))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "files": files })),
        )
        .mount(server)
        .await;
}

/// The `q` expression the adapter sends when looking up a folder by name
pub fn folder_query(name: &str) -> String {
    format!("mimeType='application/vnd.google-apps.folder' and name='{name}' and trashed=false")
}

/// The `q` expression the adapter sends when looking up a file counterpart
pub fn counterpart_query(name: &str, parent: &str) -> String {
    format!(
        "not mimeType='application/vnd.google-apps.folder' and name='{name}' \
         and '{parent}' in parents and trashed=false \
         and not properties has {{ key='no_overwrite' and value='true' }}"
    )
}

/// In-memory [`ILocalFiles`] with fixed mtimes
///
/// Real files would pick up the checkout's mtimes; fixed values keep the
/// engine's timestamp comparisons deterministic.
#[derive(Debug, Default)]
pub struct FixedLocalFiles {
    files: Mutex<HashMap<PathBuf, (i64, Vec<u8>)>>,
}

impl FixedLocalFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, mtime: i64, bytes: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), (mtime, bytes.to_vec()));
    }
}

#[async_trait::async_trait]
impl ILocalFiles for FixedLocalFiles {
    async fn mtime_seconds(&self, path: &Path) -> anyhow::Result<i64> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|(mtime, _)| *mtime)
            .ok_or_else(|| anyhow::anyhow!("no such file: {}", path.display()))
    }

    async fn read(&self, path: &Path) -> anyhow::Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| anyhow::anyhow!("no such file: {}", path.display()))
    }
}
