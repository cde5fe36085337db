//! Drive file search and upload operations
//!
//! Translates the core's object queries and metadata payloads into Drive v3
//! requests: `q`-string search, JSON metadata writes, and multipart/related
//! content uploads. Content always travels as a single multipart request;
//! the save files this tool targets are far below the resumable-upload
//! threshold.

use std::collections::HashMap;

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::debug;

use drivepush_core::domain::newtypes::FileId;
use drivepush_core::ports::remote_store::{ObjectKind, ObjectMetadata, ObjectQuery, RemoteObject};

use crate::client::DriveClient;
use crate::DriveError;

/// MIME type Drive assigns to folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Fields requested for every search result
const LIST_FIELDS: &str = "files(id,name,mimeType,description,properties)";

/// Fields requested for every create/update response
const OBJECT_FIELDS: &str = "id,name,mimeType,description,properties";

/// Boundary for multipart/related upload bodies
const MULTIPART_BOUNDARY: &str = "drivepush_related_4f9a27c1";

// ============================================================================
// Drive API response types
// ============================================================================

/// One file resource from the Drive API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    /// Drive file id
    id: String,
    /// File name
    name: String,
    /// MIME type
    mime_type: Option<String>,
    /// Free-text description
    description: Option<String>,
    /// Custom key/value properties
    properties: Option<HashMap<String, String>>,
}

impl From<DriveFile> for RemoteObject {
    fn from(file: DriveFile) -> Self {
        RemoteObject {
            id: file.id,
            name: file.name,
            mime_type: file.mime_type,
            description: file.description,
            properties: file.properties.unwrap_or_default(),
        }
    }
}

/// Response from `GET /files`
#[derive(Debug, Deserialize)]
struct FileListResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
}

// ============================================================================
// Query construction
// ============================================================================

/// Escapes a value for use inside single quotes in a Drive `q` expression
///
/// Backslashes must be escaped before quotes or the quote escape itself
/// would be re-escaped.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Builds the Drive `q` search expression for an [`ObjectQuery`]
///
/// Trashed objects are always excluded; the protection filter uses Drive's
/// `properties has` clause so tagged objects never reach the caller.
fn build_query(query: &ObjectQuery) -> String {
    let mut clauses = Vec::new();

    match query.kind {
        ObjectKind::Folder => clauses.push(format!("mimeType='{FOLDER_MIME_TYPE}'")),
        ObjectKind::File => clauses.push(format!("not mimeType='{FOLDER_MIME_TYPE}'")),
    }

    clauses.push(format!("name='{}'", escape_query_value(&query.name)));

    if let Some(parent) = &query.parent {
        // The root sentinel is also Drive's alias for the root folder, so
        // it passes through unchanged.
        clauses.push(format!(
            "'{}' in parents",
            escape_query_value(parent.as_str())
        ));
    }

    clauses.push("trashed=false".to_string());

    if let Some((key, value)) = &query.exclude_property {
        clauses.push(format!(
            "not properties has {{ key='{}' and value='{}' }}",
            escape_query_value(key),
            escape_query_value(value)
        ));
    }

    clauses.join(" and ")
}

// ============================================================================
// Metadata and multipart body construction
// ============================================================================

/// Builds the JSON metadata resource for a create or update
///
/// `include_parent` is create-only: Drive rejects `parents` in update
/// payloads (parents change through a separate move operation).
fn metadata_json(metadata: &ObjectMetadata, include_parent: bool) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    body.insert("name".to_string(), metadata.name.clone().into());

    match (metadata.kind, &metadata.mime_type) {
        (ObjectKind::Folder, _) => {
            body.insert("mimeType".to_string(), FOLDER_MIME_TYPE.into());
        }
        (ObjectKind::File, Some(mime)) => {
            body.insert("mimeType".to_string(), mime.clone().into());
        }
        (ObjectKind::File, None) => {}
    }

    if let Some(description) = &metadata.description {
        body.insert("description".to_string(), description.clone().into());
    }

    if !metadata.properties.is_empty() {
        body.insert(
            "properties".to_string(),
            serde_json::to_value(&metadata.properties).unwrap_or_default(),
        );
    }

    if include_parent {
        if let Some(parent) = &metadata.parent {
            body.insert(
                "parents".to_string(),
                serde_json::Value::Array(vec![parent.as_str().into()]),
            );
        }
    }

    serde_json::Value::Object(body)
}

/// Builds a multipart/related body: JSON metadata part, then the content part
fn build_related_body(metadata: &serde_json::Value, content: &[u8], mime_type: Option<&str>) -> Vec<u8> {
    let content_type = mime_type.unwrap_or("application/octet-stream");
    let mut body = Vec::with_capacity(content.len() + 512);
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

/// Content-Type header value for multipart/related uploads
fn related_content_type() -> String {
    format!("multipart/related; boundary={MULTIPART_BOUNDARY}")
}

// ============================================================================
// Error classification
// ============================================================================

/// Maps a non-success Drive response to a [`DriveError`]
fn classify_status(status: StatusCode, body: String) -> DriveError {
    match status {
        StatusCode::UNAUTHORIZED => DriveError::Unauthorized(body),
        StatusCode::FORBIDDEN => DriveError::Forbidden(body),
        StatusCode::NOT_FOUND => DriveError::NotFound(body),
        s if s.is_server_error() => DriveError::ServerError(body),
        _ => DriveError::InvalidResponse(format!("HTTP {status}: {body}")),
    }
}

/// Turns a response into an error when the status is not a success
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify_status(status, body).into())
}

// ============================================================================
// Operations
// ============================================================================

/// Searches for non-trashed objects matching the query
pub async fn list_objects(client: &DriveClient, query: &ObjectQuery) -> Result<Vec<RemoteObject>> {
    let q = build_query(query);
    debug!(q = %q, "Searching Drive");

    let response = client
        .request(Method::GET, "/files")
        .query(&[("q", q.as_str()), ("fields", LIST_FIELDS)])
        .send()
        .await
        .context("Failed to send search request")?;

    let listing: FileListResponse = check_status(response)
        .await?
        .json()
        .await
        .context("Failed to parse search response")?;

    debug!(count = listing.files.len(), "Search complete");
    Ok(listing.files.into_iter().map(RemoteObject::from).collect())
}

/// Creates a new object
///
/// With content this is a multipart/related upload; without content it is a
/// plain metadata insert (folders).
pub async fn create_object(
    client: &DriveClient,
    metadata: &ObjectMetadata,
    content: Option<&[u8]>,
) -> Result<RemoteObject> {
    let meta = metadata_json(metadata, true);

    let response = match content {
        Some(bytes) => {
            debug!(name = %metadata.name, size = bytes.len(), "Uploading new file");
            client
                .upload_request(Method::POST, "/files")
                .query(&[("uploadType", "multipart"), ("fields", OBJECT_FIELDS)])
                .header("Content-Type", related_content_type())
                .body(build_related_body(
                    &meta,
                    bytes,
                    metadata.mime_type.as_deref(),
                ))
                .send()
                .await
                .context("Failed to send upload request")?
        }
        None => {
            debug!(name = %metadata.name, "Creating metadata-only object");
            client
                .request(Method::POST, "/files")
                .query(&[("fields", OBJECT_FIELDS)])
                .json(&meta)
                .send()
                .await
                .context("Failed to send create request")?
        }
    };

    let file: DriveFile = check_status(response)
        .await?
        .json()
        .await
        .context("Failed to parse create response")?;
    Ok(file.into())
}

/// Overwrites an existing object's content and metadata
pub async fn update_object(
    client: &DriveClient,
    id: &FileId,
    metadata: &ObjectMetadata,
    content: Option<&[u8]>,
) -> Result<RemoteObject> {
    let meta = metadata_json(metadata, false);
    let path = format!("/files/{}", id.as_str());

    let response = match content {
        Some(bytes) => {
            debug!(id = %id, size = bytes.len(), "Uploading updated content");
            client
                .upload_request(Method::PATCH, &path)
                .query(&[("uploadType", "multipart"), ("fields", OBJECT_FIELDS)])
                .header("Content-Type", related_content_type())
                .body(build_related_body(
                    &meta,
                    bytes,
                    metadata.mime_type.as_deref(),
                ))
                .send()
                .await
                .context("Failed to send update upload request")?
        }
        None => {
            debug!(id = %id, "Updating object metadata");
            client
                .request(Method::PATCH, &path)
                .query(&[("fields", OBJECT_FIELDS)])
                .json(&meta)
                .send()
                .await
                .context("Failed to send metadata update request")?
        }
    };

    let file: DriveFile = check_status(response)
        .await?
        .json()
        .await
        .context("Failed to parse update response")?;
    Ok(file.into())
}

/// Moves an object to the Drive trash
pub async fn trash_object(client: &DriveClient, id: &FileId) -> Result<()> {
    let path = format!("/files/{}", id.as_str());
    debug!(id = %id, "Trashing object");

    let response = client
        .request(Method::PATCH, &path)
        .json(&serde_json::json!({ "trashed": true }))
        .send()
        .await
        .context("Failed to send trash request")?;

    check_status(response).await?;
    Ok(())
}
