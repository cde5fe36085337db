//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for remote identifiers, file names, and the
//! custom modification stamp. Each newtype ensures data validity at
//! construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Name of the root sentinel folder: no remote lookup, backend-default placement
const ROOT_SENTINEL: &str = "root";

/// Strftime pattern used in all timestamp status lines
const STAMP_FORMAT: &str = "%Y-%m-%d, %H:%M:%S";

// ============================================================================
// FileId
// ============================================================================

/// Opaque identifier of a remote file object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    /// Creates a FileId, rejecting empty strings
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.is_empty() {
            return Err(DomainError::InvalidId("empty file id".to_string()));
        }
        Ok(Self(id))
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FileId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ============================================================================
// FolderId
// ============================================================================

/// Identifier of a remote folder, or the root sentinel
///
/// The sentinel value `"root"` means "no folder": lookups pass it through
/// unchanged and creates omit the parent, letting the backend use its
/// default placement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(String);

impl FolderId {
    /// Creates a FolderId, rejecting empty strings
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.is_empty() {
            return Err(DomainError::InvalidId("empty folder id".to_string()));
        }
        Ok(Self(id))
    }

    /// The root sentinel folder
    pub fn root() -> Self {
        Self(ROOT_SENTINEL.to_string())
    }

    /// Returns true if this is the root sentinel
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_SENTINEL
    }

    /// Returns true if `name` names the root sentinel
    pub fn is_root_name(name: &str) -> bool {
        name == ROOT_SENTINEL
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FolderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// FileName
// ============================================================================

/// Base name of a file, used as the remote lookup key
///
/// Must be non-empty and must not contain a path separator; callers are
/// expected to have already split the base name off a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileName(String);

impl FileName {
    /// Creates a FileName, rejecting empty strings and embedded separators
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.is_empty() {
            return Err(DomainError::InvalidFileName("empty name".to_string()));
        }
        if name.contains('/') || name.contains('\\') {
            return Err(DomainError::InvalidFileName(name));
        }
        Ok(Self(name))
    }

    /// Returns the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FileName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ModifiedStamp
// ============================================================================

/// Modification time as truncated Unix seconds
///
/// This is the application-level `modified` property, not the backend's
/// native modification time. The backend rewrites its own mtime on every
/// API write, so it can never reflect the *local* file's mtime; all
/// comparisons use this custom property with strict integer ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifiedStamp(i64);

impl ModifiedStamp {
    /// Creates a stamp from truncated Unix seconds
    pub fn from_unix_seconds(secs: i64) -> Self {
        Self(secs)
    }

    /// Parses a stamp from a remote `modified` property value
    pub fn from_property(value: &str) -> Result<Self, DomainError> {
        value
            .trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| DomainError::InvalidStamp(value.to_string()))
    }

    /// Returns the stamp as Unix seconds
    pub fn as_unix_seconds(&self) -> i64 {
        self.0
    }

    /// The property value written to remote metadata
    pub fn to_property(&self) -> String {
        self.0.to_string()
    }

    /// Renders the stamp as `YYYY-MM-DD, HH:MM:SS` in local time
    pub fn render(&self) -> String {
        match Local.timestamp_opt(self.0, 0).single() {
            Some(dt) => dt.format(STAMP_FORMAT).to_string(),
            None => format!("invalid timestamp ({})", self.0),
        }
    }

    /// Renders an optional stamp, using `Undefined` when absent
    pub fn render_opt(stamp: Option<&ModifiedStamp>) -> String {
        match stamp {
            Some(s) => s.render(),
            None => "Undefined".to_string(),
        }
    }
}

impl Display for ModifiedStamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
