//! DrivePush GDrive - Google Drive API client
//!
//! Provides an async client for:
//! - OAuth2 authentication (Authorization Code with PKCE)
//! - Drive file operations (search, multipart upload, metadata updates)
//! - The [`drivepush_core::ports::IRemoteStore`] port, backed by Drive v3
//!
//! ## Modules
//!
//! - [`auth`] - OAuth2 PKCE authentication flow components
//! - [`client`] - Google Drive API HTTP client
//! - [`files`] - File search and multipart upload operations
//! - [`store`] - `IRemoteStore` adapter delegating to [`files`]

pub mod auth;
pub mod client;
pub mod files;
pub mod store;

use thiserror::Error;

/// Errors that can occur when communicating with the Google Drive API
#[derive(Debug, Error)]
pub enum DriveError {
    /// Authentication credentials are invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions for the requested operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The OAuth2 token has expired and must be refreshed
    #[error("Token expired")]
    TokenExpired,

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
