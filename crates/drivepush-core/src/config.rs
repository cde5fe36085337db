//! Configuration module for DrivePush.
//!
//! Two configuration layers live here:
//! - [`UploadConfig`] / [`Mode`] - the immutable per-invocation settings the
//!   decision engine consumes, built from CLI arguments.
//! - [`Config`] - the YAML configuration file holding OAuth client settings
//!   and the token cache location, with loading and defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Upload mode
// ---------------------------------------------------------------------------

/// Upload mode as a tagged variant
///
/// Force and check-only are mutually exclusive by construction; there is no
/// invalid flag combination to reject at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Compare custom `modified` stamps; overwrite only when remote is older
    #[default]
    Normal,
    /// Overwrite any counterpart unconditionally, regardless of timestamps
    Force,
    /// Dry-run: report the action that would be taken, never write
    CheckOnly,
}

// ---------------------------------------------------------------------------
// UploadConfig
// ---------------------------------------------------------------------------

/// Immutable per-invocation upload settings
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Ordered local file specifiers (paths or names relative to `home_dir`)
    pub file_list: Vec<String>,
    /// Target remote folder name, or `"root"` for no folder
    pub folder: String,
    /// MIME type override; None lets the backend infer it
    pub mime_type: Option<String>,
    /// Base directory for resolving relative file specifiers
    pub home_dir: Option<PathBuf>,
    /// Tag newly created objects so future runs never overwrite them
    pub protect: bool,
    /// Description attached to created/updated object metadata
    pub description: Option<String>,
    pub mode: Mode,
}

impl UploadConfig {
    /// Builds a config from a comma-delimited file list
    ///
    /// The list is split on commas with no escaping; empty segments are
    /// dropped. A file name containing a comma cannot be expressed.
    pub fn from_list_str(file_list: &str, folder: impl Into<String>, mode: Mode) -> Self {
        Self {
            file_list: split_file_list(file_list),
            folder: folder.into(),
            mime_type: None,
            home_dir: None,
            protect: false,
            description: None,
            mode,
        }
    }

    pub fn with_mime_type(mut self, mime_type: Option<String>) -> Self {
        self.mime_type = mime_type;
        self
    }

    pub fn with_home_dir(mut self, home_dir: Option<PathBuf>) -> Self {
        self.home_dir = home_dir;
        self
    }

    pub fn with_protection(mut self, protect: bool) -> Self {
        self.protect = protect;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

/// Splits a comma-delimited file list, dropping empty segments
pub fn split_file_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// YAML configuration file
// ---------------------------------------------------------------------------

/// Top-level configuration for DrivePush.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub auth: AuthConfig,
}

/// Authentication / OAuth settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Google OAuth client ID. `None` until the user runs `drivepush auth login`.
    pub client_id: Option<String>,
    /// OAuth client secret for installed-application clients.
    pub client_secret: Option<String>,
    /// Override for the token cache file location.
    pub token_cache: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/drivepush/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("drivepush")
            .join("config.yaml")
    }

    /// Resolved token cache path: the configured override, or
    /// `$XDG_CONFIG_HOME/drivepush/credentials.json`.
    pub fn token_cache_path(&self) -> PathBuf {
        self.auth.token_cache.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("~/.config"))
                .join("drivepush")
                .join("credentials.json")
        })
    }
}
