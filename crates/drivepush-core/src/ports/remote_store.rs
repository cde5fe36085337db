//! Remote store port (driven/secondary port)
//!
//! This module defines the interface for interacting with the remote
//! object-storage backend. The primary implementation targets Google Drive
//! via its v3 REST API, but the trait is provider-agnostic.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are
//!   adapter-specific and don't need domain-level classification.
//! - Uses `#[async_trait]` for async trait methods.
//! - `RemoteObject` is a port-level DTO, not a domain entity; the use cases
//!   are responsible for interpreting its `properties`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::newtypes::{FileId, FolderId, ModifiedStamp};

/// Custom metadata key holding the local file's truncated Unix mtime
pub const MODIFIED_PROPERTY: &str = "modified";

/// Custom metadata key marking a write-once object that counterpart
/// lookups must never return
pub const NO_OVERWRITE_PROPERTY: &str = "no_overwrite";

// ============================================================================
// DTOs
// ============================================================================

/// Object kind filter for queries and metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    File,
    Folder,
}

/// A remote object returned by a lookup
///
/// The only property the core consumes is `modified`; everything else is
/// carried opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteObject {
    /// Provider-specific object identifier
    pub id: String,
    /// Object name
    pub name: String,
    /// Declared MIME type, if the provider reports one
    pub mime_type: Option<String>,
    /// Optional free-form description
    pub description: Option<String>,
    /// Custom string properties attached to the object
    pub properties: HashMap<String, String>,
}

impl RemoteObject {
    /// The custom `modified` stamp, if present and parseable
    ///
    /// An unparseable value is treated the same as an absent one: the
    /// caller cannot compare against it, so force is required.
    pub fn modified_stamp(&self) -> Option<ModifiedStamp> {
        self.properties
            .get(MODIFIED_PROPERTY)
            .and_then(|v| ModifiedStamp::from_property(v).ok())
    }
}

/// Query predicate for [`IRemoteStore::list`]
///
/// Supports exactly the filters the core needs: kind, exact name, parent
/// membership, and exclusion of objects carrying a given property value.
/// Trashed objects are always excluded.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectQuery {
    /// Folder vs. file
    pub kind: ObjectKind,
    /// Exact name match
    pub name: String,
    /// Restrict to children of this folder (None: anywhere)
    pub parent: Option<FolderId>,
    /// Exclude objects where this `(key, value)` property is present
    pub exclude_property: Option<(String, String)>,
}

impl ObjectQuery {
    /// Query for a non-trashed folder by exact name, anywhere
    pub fn folder(name: impl Into<String>) -> Self {
        Self {
            kind: ObjectKind::Folder,
            name: name.into(),
            parent: None,
            exclude_property: None,
        }
    }

    /// Counterpart query: a non-trashed file with this name inside `parent`,
    /// excluding protection-tagged objects
    pub fn counterpart(name: impl Into<String>, parent: FolderId) -> Self {
        Self {
            kind: ObjectKind::File,
            name: name.into(),
            parent: Some(parent),
            exclude_property: Some((NO_OVERWRITE_PROPERTY.to_string(), "true".to_string())),
        }
    }
}

/// Metadata payload for create and update operations
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMetadata {
    pub kind: ObjectKind,
    pub name: String,
    /// MIME type override; None lets the backend infer it
    pub mime_type: Option<String>,
    pub description: Option<String>,
    pub properties: HashMap<String, String>,
    /// Parent folder for creates; None means backend-default placement.
    /// Ignored by updates.
    pub parent: Option<FolderId>,
}

impl ObjectMetadata {
    /// Metadata for a new folder
    pub fn folder(name: impl Into<String>) -> Self {
        Self {
            kind: ObjectKind::Folder,
            name: name.into(),
            mime_type: None,
            description: None,
            properties: HashMap::new(),
            parent: None,
        }
    }

    /// Metadata for a file carrying the custom `modified` stamp
    pub fn file(name: impl Into<String>, modified: ModifiedStamp) -> Self {
        let mut properties = HashMap::new();
        properties.insert(MODIFIED_PROPERTY.to_string(), modified.to_property());
        Self {
            kind: ObjectKind::File,
            name: name.into(),
            mime_type: None,
            description: None,
            properties,
            parent: None,
        }
    }

    /// Attaches the write-once protection tag (create-time only)
    pub fn with_protection(mut self) -> Self {
        self.properties
            .insert(NO_OVERWRITE_PROPERTY.to_string(), "true".to_string());
        self
    }

    pub fn with_mime_type(mut self, mime: Option<String>) -> Self {
        self.mime_type = mime;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_parent(mut self, parent: Option<FolderId>) -> Self {
        self.parent = parent;
        self
    }
}

// ============================================================================
// IRemoteStore trait
// ============================================================================

/// Port trait for the remote object-storage backend
///
/// ## Implementation Notes
///
/// - `list` must exclude trashed objects and apply the query's
///   `exclude_property` filter server-side where the provider supports it.
/// - No retry is performed at this layer; callers treat failures as
///   `RemoteServiceError` for the affected operation.
/// - `trash` exists for test harnesses (cleaning up created objects); the
///   upload engine never calls it.
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Lists non-trashed objects matching the query
    ///
    /// No result ordering is guaranteed by the backend; callers that need
    /// determinism must sort.
    async fn list(&self, query: &ObjectQuery) -> anyhow::Result<Vec<RemoteObject>>;

    /// Creates a new object with the given metadata and optional content
    async fn create(
        &self,
        metadata: &ObjectMetadata,
        content: Option<&[u8]>,
    ) -> anyhow::Result<RemoteObject>;

    /// Replaces an existing object's metadata and optionally its content
    async fn update(
        &self,
        id: &FileId,
        metadata: &ObjectMetadata,
        content: Option<&[u8]>,
    ) -> anyhow::Result<RemoteObject>;

    /// Moves an object to the trash
    async fn trash(&self, id: &FileId) -> anyhow::Result<()>;
}
