//! Per-file upload outcomes and batch reporting
//!
//! Every file processed by the decision engine yields exactly one
//! [`Outcome`]. Skip and check-only outcomes carry both timestamps so the
//! status line can show them; write outcomes record what was written.

use serde::Serialize;

use super::errors::UploadError;
use super::newtypes::{FileId, ModifiedStamp};

/// The decision taken (or reported) for a single file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// A new remote object was created
    Created { id: FileId, modified: ModifiedStamp },

    /// The existing counterpart was overwritten
    Updated { id: FileId, modified: ModifiedStamp },

    /// Remote `modified` is newer than the local mtime; no write
    SkippedRemoteNewer {
        local: ModifiedStamp,
        remote: ModifiedStamp,
    },

    /// Remote `modified` equals the local mtime; no write
    SkippedSameStamp {
        local: ModifiedStamp,
        remote: ModifiedStamp,
    },

    /// Counterpart has no usable `modified` property; force required
    SkippedMissingStamp { local: ModifiedStamp },

    /// Check-only: no counterpart exists, a create would be performed
    WouldCreate { local: ModifiedStamp },

    /// Check-only: a counterpart exists, an update would be performed
    WouldUpdate {
        local: ModifiedStamp,
        remote: Option<ModifiedStamp>,
    },

    /// The file could not be processed
    Failed { error: UploadError },
}

impl Outcome {
    /// Returns true if this outcome performed a remote write
    pub fn wrote(&self) -> bool {
        matches!(self, Outcome::Created { .. } | Outcome::Updated { .. })
    }

    /// Returns true if this outcome is a failure (skips are not failures)
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

/// Report for one file in the batch
///
/// `filename` is a plain string rather than a validated [`super::newtypes::FileName`]
/// so that files whose specifier could not even be split into a base name
/// still get a report entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub filename: String,
    pub outcome: Outcome,
}

impl FileReport {
    pub fn new(filename: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            filename: filename.into(),
            outcome,
        }
    }

    /// Human-readable status line for this file
    ///
    /// Skip and check-only lines include both timestamps in
    /// `YYYY-MM-DD, HH:MM:SS` local time, with `Undefined` standing in for
    /// an absent remote stamp.
    pub fn status_line(&self) -> String {
        let name = self.filename.as_str();
        let name = if name.is_empty() { "<unnamed>" } else { name };
        match &self.outcome {
            Outcome::Created { .. } => format!("File {name} uploaded."),
            Outcome::Updated { .. } => format!("File {name} updated."),
            Outcome::SkippedRemoteNewer { local, remote } => format!(
                "File {name} was last modified after local file. Not updated; force upload required.\n{}",
                stamp_block(name, *local, Some(*remote)),
            ),
            Outcome::SkippedSameStamp { local, remote } => format!(
                "File {name} has same last modified date. Not updated; force upload required.\n{}",
                stamp_block(name, *local, Some(*remote)),
            ),
            Outcome::SkippedMissingStamp { local } => format!(
                "Properties not defined for {name}. Use force upload.\n{}",
                stamp_block(name, *local, None),
            ),
            Outcome::WouldCreate { local } => format!(
                "File {name} does not exist remotely. Ready to upload.\n{}",
                stamp_block(name, *local, None),
            ),
            Outcome::WouldUpdate { local, remote } => format!(
                "File {name} is ready to upload.\n{}",
                stamp_block(name, *local, *remote),
            ),
            Outcome::Failed { error } => format!("File {name} failed: {error}"),
        }
    }
}

/// The two-timestamp block appended to skip and check-only lines
fn stamp_block(name: &str, local: ModifiedStamp, remote: Option<ModifiedStamp>) -> String {
    format!(
        "{}:\n  Local file last updated: {}\n  Remote file last updated: {}",
        name,
        local.render(),
        ModifiedStamp::render_opt(remote.as_ref()),
    )
}

/// Outcomes for a whole upload invocation, in input order
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub reports: Vec<FileReport>,
}

impl BatchReport {
    pub fn push(&mut self, report: FileReport) {
        self.reports.push(report);
    }

    /// Number of remote writes performed
    pub fn writes(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.wrote()).count()
    }

    /// Number of files that failed
    pub fn failures(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome.is_failure())
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failures() > 0
    }
}
