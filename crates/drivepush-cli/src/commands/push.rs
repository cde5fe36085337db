//! Push command - upload a list of local files to Google Drive
//!
//! Wires the upload engine to the Drive adapter: resolves credentials,
//! builds the remote store and local filesystem ports, runs the batch, and
//! renders one status block per file.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use drivepush_core::config::{Mode, UploadConfig};
use drivepush_core::usecases::UploadFilesUseCase;
use drivepush_gdrive::client::DriveClient;
use drivepush_gdrive::store::DriveRemoteStore;

use crate::commands::{build_authenticator, load_config};
use crate::localfs::TokioLocalFiles;
use crate::output::{get_formatter, OutputFormat, OutputFormatter};

#[derive(Debug, Args)]
pub struct PushCommand {
    /// Comma-separated list of files to upload
    file_list: String,

    /// Directory the listed paths are relative to
    #[arg(short = 'd', long = "home-dir")]
    home_dir: Option<PathBuf>,

    /// Drive folder to upload into; "root" means the Drive root
    #[arg(long, default_value = "root")]
    folder: String,

    /// Upload even when the remote copy is newer or has no timestamp
    #[arg(long, group = "conflict")]
    force: bool,

    /// Report what would happen without uploading anything
    #[arg(short = 'c', long = "check", group = "conflict")]
    check: bool,

    /// Upload a protected copy that later runs will not overwrite
    #[arg(long = "no-overwrite", group = "conflict")]
    no_overwrite: bool,

    /// Explicit MIME type for the uploaded content
    #[arg(long)]
    mimetype: Option<String>,

    /// Description attached to the uploaded files
    #[arg(long)]
    description: Option<String>,

    /// Wait for enter before exiting
    #[arg(long)]
    pause: bool,
}

impl PushCommand {
    pub async fn execute(&self, format: OutputFormat, config_path: Option<&Path>) -> Result<()> {
        let fmt = get_formatter(format == OutputFormat::Json);

        let result = self.run_batch(format, &*fmt, config_path).await;

        if self.pause {
            wait_for_enter();
        }
        result
    }

    async fn run_batch(
        &self,
        format: OutputFormat,
        fmt: &dyn OutputFormatter,
        config_path: Option<&Path>,
    ) -> Result<()> {
        let app_config = load_config(config_path);

        // Credentials: cached tokens, silent refresh, or browser login.
        let authenticator = build_authenticator(&app_config, None)?;
        let tokens = authenticator
            .obtain()
            .await
            .context("Failed to obtain Drive credentials")?;

        let store = DriveRemoteStore::new(DriveClient::new(&tokens.access_token));
        let local = Arc::new(TokioLocalFiles);

        let config = UploadConfig::from_list_str(&self.file_list, &self.folder, self.mode())
            .with_home_dir(self.home_dir.clone())
            .with_protection(self.no_overwrite)
            .with_mime_type(self.mimetype.clone())
            .with_description(self.description.clone());

        if config.file_list.is_empty() {
            anyhow::bail!("The file list is empty");
        }

        info!(files = config.file_list.len(), folder = %config.folder, "Pushing files");

        let report = UploadFilesUseCase::new(Arc::new(store), local, config)
            .run()
            .await?;

        for file_report in &report.reports {
            file_report_output(fmt, file_report);
        }

        if format == OutputFormat::Json {
            fmt.print_json(&serde_json::to_value(&report).unwrap_or_default());
        } else {
            fmt.success(&format!(
                "{} of {} file(s) written, {} failed",
                report.writes(),
                report.reports.len(),
                report.failures()
            ));
        }

        if report.has_failures() {
            anyhow::bail!("{} file(s) could not be uploaded", report.failures());
        }
        Ok(())
    }

    fn mode(&self) -> Mode {
        if self.force {
            Mode::Force
        } else if self.check {
            Mode::CheckOnly
        } else {
            Mode::Normal
        }
    }
}

fn file_report_output(
    fmt: &dyn OutputFormatter,
    report: &drivepush_core::domain::FileReport,
) {
    if report.outcome.is_failure() {
        fmt.error(&report.status_line());
    } else {
        fmt.report(&report.status_line());
    }
}

/// Blocks until the user presses enter
fn wait_for_enter() {
    println!("Press enter to close.");
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
}
