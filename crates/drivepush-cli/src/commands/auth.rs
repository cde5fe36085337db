//! Auth commands - Login, Logout, and Status for Google Drive authentication
//!
//! Provides the `drivepush auth` CLI subcommands:
//! 1. `login`  - Runs the OAuth2 PKCE flow via DriveAuthenticator, caches
//!    tokens on disk, and fetches account information.
//! 2. `logout` - Deletes the cached tokens.
//! 3. `status` - Shows the cached token validity and account info.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use drivepush_gdrive::client::DriveClient;

use crate::commands::{build_authenticator, load_config};
use crate::output::{get_formatter, OutputFormat, OutputFormatter};

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Authenticate with Google Drive via OAuth2
    Login {
        /// OAuth client ID from the Google Cloud console
        #[arg(long)]
        client_id: Option<String>,
    },
    /// Remove stored credentials
    Logout,
    /// Check authentication status
    Status,
}

impl AuthCommand {
    pub async fn execute(&self, format: OutputFormat, config_path: Option<&Path>) -> Result<()> {
        let fmt = get_formatter(format == OutputFormat::Json);
        match self {
            AuthCommand::Login { client_id } => {
                self.execute_login(client_id.as_deref(), config_path, &*fmt)
                    .await
            }
            AuthCommand::Logout => self.execute_logout(config_path, &*fmt),
            AuthCommand::Status => self.execute_status(config_path, &*fmt, format),
        }
    }

    /// Execute the login flow:
    /// 1. Load config to get the OAuth client
    /// 2. Run OAuth2 PKCE via DriveAuthenticator; tokens land in the cache
    /// 3. Fetch account information from the Drive API
    async fn execute_login(
        &self,
        cli_client_id: Option<&str>,
        config_path: Option<&Path>,
        fmt: &dyn OutputFormatter,
    ) -> Result<()> {
        let config = load_config(config_path);
        let authenticator = build_authenticator(&config, cli_client_id)?;

        info!("Starting OAuth2 login");
        fmt.info("Opening browser for Google login...");
        let tokens = authenticator.login().await.context("OAuth2 login failed")?;

        fmt.info("Retrieving account information...");
        let client = DriveClient::new(&tokens.access_token);
        let user_info = client
            .get_user_info()
            .await
            .context("Failed to retrieve account info from the Drive API")?;

        info!(email = %user_info.email, "Got user info");

        fmt.success(&format!(
            "Authenticated as {} ({})",
            user_info.display_name, user_info.email
        ));

        let quota_used_mb = user_info.quota_used as f64 / 1_048_576.0;
        if user_info.quota_total > 0 {
            let quota_total_gb = user_info.quota_total as f64 / 1_073_741_824.0;
            fmt.info(&format!(
                "Storage: {:.1} MB used / {:.1} GB total",
                quota_used_mb, quota_total_gb
            ));
        } else {
            fmt.info(&format!("Storage: {:.1} MB used", quota_used_mb));
        }

        Ok(())
    }

    fn execute_logout(&self, config_path: Option<&Path>, fmt: &dyn OutputFormatter) -> Result<()> {
        let config = load_config(config_path);
        let cache = config.token_cache_path();
        drivepush_gdrive::auth::FileTokenStorage::new(&cache)
            .clear()
            .context("Failed to remove cached credentials")?;
        fmt.success("Stored credentials removed");
        Ok(())
    }

    fn execute_status(
        &self,
        config_path: Option<&Path>,
        fmt: &dyn OutputFormatter,
        format: OutputFormat,
    ) -> Result<()> {
        let config = load_config(config_path);
        let cache = config.token_cache_path();
        let cached = drivepush_gdrive::auth::FileTokenStorage::new(&cache)
            .load()
            .context("Failed to read token cache")?;

        match cached {
            None => {
                if format == OutputFormat::Json {
                    fmt.print_json(&serde_json::json!({ "authenticated": false }));
                } else {
                    fmt.warn("Not authenticated. Run `drivepush auth login`.");
                }
            }
            Some(tokens) => {
                let expired = tokens.is_expired();
                if format == OutputFormat::Json {
                    fmt.print_json(&serde_json::json!({
                        "authenticated": true,
                        "access_token_expired": expired,
                        "has_refresh_token": tokens.refresh_token.is_some(),
                        "expires_at": tokens.expires_at.to_rfc3339(),
                    }));
                } else if expired {
                    fmt.warn("Access token expired; it will be refreshed on the next push.");
                    fmt.info(&format!("Token cache: {}", cache.display()));
                } else {
                    fmt.success("Authenticated");
                    fmt.info(&format!("Access token valid until {}", tokens.expires_at));
                    fmt.info(&format!("Token cache: {}", cache.display()));
                }
            }
        }
        Ok(())
    }
}
