//! Google Drive API client
//!
//! Provides a typed HTTP client for the Google Drive v3 API. Handles
//! authentication headers, JSON deserialization, and endpoint construction
//! for both the metadata host and the upload host.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use drivepush_gdrive::client::DriveClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = DriveClient::new("access-token-here");
//! let user_info = client.get_user_info().await?;
//! println!("Hello, {}", user_info.display_name);
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, warn};

/// Base URL for Drive v3 metadata operations
const DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Base URL for Drive v3 content uploads (`uploadType=multipart`)
const DRIVE_UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";

// ============================================================================
// Drive API response types
// ============================================================================

/// Response from the /about endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AboutResponse {
    /// Authenticated user
    user: Option<AboutUser>,
    /// Storage quota information
    storage_quota: Option<StorageQuota>,
}

/// User section of the /about response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AboutUser {
    /// User's display name
    display_name: Option<String>,
    /// User's email address
    email_address: Option<String>,
    /// Opaque permission id for the user
    permission_id: Option<String>,
}

/// Storage quota section of the /about response
///
/// Drive serializes these int64 values as JSON *strings*, hence the
/// `Option<String>` fields and explicit parsing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageQuota {
    /// Total storage in bytes; absent for unlimited quotas
    limit: Option<String>,
    /// Used storage in bytes
    usage: Option<String>,
}

/// Profile and quota data for the authenticated user
#[derive(Debug, Clone, PartialEq)]
pub struct UserInfo {
    pub email: String,
    pub display_name: String,
    pub id: String,
    pub quota_used: u64,
    /// 0 means the quota is unlimited or unknown
    pub quota_total: u64,
}

// ============================================================================
// DriveClient
// ============================================================================

/// HTTP client for Google Drive API calls
///
/// Wraps `reqwest::Client` with authentication headers and base URL
/// construction for the two Drive hosts (metadata and upload).
pub struct DriveClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for metadata requests
    base_url: String,
    /// Base URL for content upload requests
    upload_base_url: String,
    /// Current OAuth2 access token
    access_token: String,
}

impl DriveClient {
    /// Creates a new DriveClient with the given access token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DRIVE_BASE_URL.to_string(),
            upload_base_url: DRIVE_UPLOAD_BASE_URL.to_string(),
            access_token: access_token.into(),
        }
    }

    /// Creates a DriveClient with custom base URLs (useful for testing)
    ///
    /// Both the metadata and upload hosts point at `base_url`; wiremock
    /// serves both from one server.
    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            upload_base_url: base_url.clone(),
            base_url,
            access_token: access_token.into(),
        }
    }

    /// Updates the access token (e.g., after a token refresh)
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = token.into();
        debug!("Updated DriveClient access token");
    }

    /// Returns a reference to the current access token
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Creates an authenticated request builder against the metadata host
    ///
    /// # Arguments
    /// * `method` - HTTP method (GET, POST, PATCH, DELETE, etc.)
    /// * `path` - API path relative to the base URL (e.g., "/files")
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .bearer_auth(&self.access_token)
    }

    /// Creates an authenticated request builder against the upload host
    ///
    /// Content uploads go through a distinct Google host; the path is the
    /// same `/files[/{id}]` shape as the metadata endpoints.
    pub fn upload_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.upload_base_url, path);
        self.client
            .request(method, &url)
            .bearer_auth(&self.access_token)
    }

    /// Retrieves profile and quota data for the authenticated user
    ///
    /// Makes `GET /about?fields=user,storageQuota`.
    pub async fn get_user_info(&self) -> Result<UserInfo> {
        debug!("Fetching user info from /about");

        let about: AboutResponse = self
            .request(Method::GET, "/about")
            .query(&[("fields", "user,storageQuota")])
            .send()
            .await
            .context("Failed to fetch /about")?
            .error_for_status()
            .context("GET /about returned error status")?
            .json()
            .await
            .context("Failed to parse /about response")?;

        let user = about.user.unwrap_or(AboutUser {
            display_name: None,
            email_address: None,
            permission_id: None,
        });

        let email = user
            .email_address
            .unwrap_or_else(|| "unknown@unknown.com".to_string());
        let display_name = user
            .display_name
            .unwrap_or_else(|| "Unknown User".to_string());
        let id = user.permission_id.unwrap_or_default();

        let (quota_used, quota_total) = match about.storage_quota {
            Some(quota) => (
                parse_quota_bytes(quota.usage.as_deref()),
                parse_quota_bytes(quota.limit.as_deref()),
            ),
            None => (0, 0),
        };

        if quota_total == 0 {
            warn!("Storage quota limit is absent; the account may have unlimited storage");
        }

        Ok(UserInfo {
            email,
            display_name,
            id,
            quota_used,
            quota_total,
        })
    }

    /// Returns the base URL for metadata requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Parses a Drive quota value (int64 serialized as a JSON string)
fn parse_quota_bytes(value: Option<&str>) -> u64 {
    value.and_then(|v| v.parse::<u64>().ok()).unwrap_or(0)
}
