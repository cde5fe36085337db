//! CLI command implementations

pub mod auth;
pub mod push;

use std::path::Path;

use drivepush_core::config::Config;
use drivepush_gdrive::auth::{DriveAuthenticator, FileTokenStorage, OAuthConfig};

/// Loads the application config from the given path or the default location
pub(crate) fn load_config(config_path: Option<&Path>) -> Config {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_path);
    Config::load_or_default(&path)
}

/// Builds an authenticator from the config plus an optional CLI override
pub(crate) fn build_authenticator(
    config: &Config,
    cli_client_id: Option<&str>,
) -> anyhow::Result<DriveAuthenticator> {
    let client_id = cli_client_id
        .map(str::to_string)
        .or_else(|| config.auth.client_id.clone())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No client_id provided. Use --client-id or set auth.client_id in config.yaml"
            )
        })?;

    let oauth = OAuthConfig::new(client_id).with_client_secret(config.auth.client_secret.clone());
    let storage = FileTokenStorage::new(config.token_cache_path());
    Ok(DriveAuthenticator::new(oauth, storage))
}
