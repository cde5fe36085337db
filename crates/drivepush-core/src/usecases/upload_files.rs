//! Upload decision engine
//!
//! Orchestrates the per-file create / overwrite / skip protocol: for each
//! local file, look up the existing remote counterpart (protected objects
//! are invisible), compare the custom `modified` stamps, and perform at
//! most one remote write. Files are processed strictly sequentially, in
//! list order, and each file's failure is isolated into its own report so
//! one bad path does not abort the batch.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::{Mode, UploadConfig};
use crate::domain::newtypes::{FileId, FileName, FolderId, ModifiedStamp};
use crate::domain::outcome::{BatchReport, FileReport, Outcome};
use crate::domain::UploadError;
use crate::ports::remote_store::{IRemoteStore, ObjectMetadata, ObjectQuery};
use crate::ports::ILocalFiles;
use crate::usecases::resolve_folder::ResolveFolderUseCase;

/// A usable counterpart: the remote object an upload would overwrite
#[derive(Debug, Clone, PartialEq)]
struct Counterpart {
    id: FileId,
    modified: Option<ModifiedStamp>,
}

/// The action the decision protocol settled on
#[derive(Debug, Clone, PartialEq)]
enum Decision {
    /// Create a new remote object
    Create,
    /// Overwrite this counterpart's content and metadata
    Overwrite(FileId),
    /// No write; the outcome is already final
    Done(Outcome),
}

/// Applies the decision precedence from the upload protocol
///
/// Pure function: first matching rule wins. Callers have already dropped
/// counterparts that are invisible to this run (protected, trashed).
fn decide(mode: Mode, local: ModifiedStamp, counterpart: Option<&Counterpart>) -> Decision {
    match counterpart {
        Some(remote) => match mode {
            Mode::CheckOnly => Decision::Done(Outcome::WouldUpdate {
                local,
                remote: remote.modified,
            }),
            Mode::Force => Decision::Overwrite(remote.id.clone()),
            Mode::Normal => match remote.modified {
                None => Decision::Done(Outcome::SkippedMissingStamp { local }),
                Some(stamp) if stamp > local => Decision::Done(Outcome::SkippedRemoteNewer {
                    local,
                    remote: stamp,
                }),
                Some(stamp) if stamp == local => Decision::Done(Outcome::SkippedSameStamp {
                    local,
                    remote: stamp,
                }),
                Some(_) => Decision::Overwrite(remote.id.clone()),
            },
        },
        None => match mode {
            Mode::CheckOnly => Decision::Done(Outcome::WouldCreate { local }),
            Mode::Normal | Mode::Force => Decision::Create,
        },
    }
}

/// Use case driving the whole upload batch
pub struct UploadFilesUseCase {
    remote: Arc<dyn IRemoteStore>,
    local: Arc<dyn ILocalFiles>,
    config: UploadConfig,
}

impl UploadFilesUseCase {
    pub fn new(
        remote: Arc<dyn IRemoteStore>,
        local: Arc<dyn ILocalFiles>,
        config: UploadConfig,
    ) -> Self {
        Self {
            remote,
            local,
            config,
        }
    }

    /// Runs the batch and returns one report per input file, in order
    ///
    /// # Errors
    ///
    /// Only folder resolution is fatal for the run; every per-file fault
    /// becomes an [`Outcome::Failed`] entry and the batch continues.
    pub async fn run(&self) -> Result<BatchReport> {
        // Resolved once up front: resolution is idempotent, and doing it
        // outside the loop keeps the create-if-absent invariant safe if the
        // loop is ever parallelized.
        let folder = ResolveFolderUseCase::new(self.remote.clone())
            .resolve(&self.config.folder)
            .await
            .context("Failed to resolve the target folder")?;

        info!(
            folder = %folder,
            files = self.config.file_list.len(),
            mode = ?self.config.mode,
            "Starting upload batch"
        );

        let mut batch = BatchReport::default();
        for spec in &self.config.file_list {
            let report = self.process_file(spec, &folder).await;
            debug!(file = %report.filename, outcome = ?report.outcome, "Processed file");
            batch.push(report);
        }
        Ok(batch)
    }

    /// Decides and executes the action for a single file; never fails the batch
    async fn process_file(&self, spec: &str, folder: &FolderId) -> FileReport {
        // Step 1: split the base name off the specifier.
        let filename = match file_name_of(spec) {
            Ok(name) => name,
            Err(error) => return FileReport::new(spec, Outcome::Failed { error }),
        };

        // Step 2: resolve the path and read the local mtime.
        let path = self.resolve_path(spec);
        let local = match self.local.mtime_seconds(&path).await {
            Ok(secs) => ModifiedStamp::from_unix_seconds(secs),
            Err(e) => {
                return FileReport::new(
                    filename.as_str(),
                    Outcome::Failed {
                        error: UploadError::local(
                            &e.context(format!("Failed to stat {}", path.display())),
                        ),
                    },
                )
            }
        };

        // Step 3: find the counterpart. With protection configured the
        // lookup result could never be used (new objects are always
        // created), so it is skipped entirely.
        let counterpart = if self.config.protect {
            None
        } else {
            match self.find_counterpart(&filename, folder).await {
                Ok(counterpart) => counterpart,
                Err(error) => return FileReport::new(filename.as_str(), Outcome::Failed { error }),
            }
        };

        // Step 4: decide and execute.
        let outcome = match decide(self.config.mode, local, counterpart.as_ref()) {
            Decision::Done(outcome) => outcome,
            Decision::Create => self.execute_create(&filename, &path, local, folder).await,
            Decision::Overwrite(id) => self.execute_overwrite(&filename, &path, local, id).await,
        };
        FileReport::new(filename.as_str(), outcome)
    }

    fn resolve_path(&self, spec: &str) -> PathBuf {
        match &self.config.home_dir {
            Some(home) => home.join(spec),
            None => PathBuf::from(spec),
        }
    }

    /// Exact-name lookup within the folder, excluding trashed and protected
    /// objects. At most one result is used; the lowest id wins so reruns
    /// are deterministic.
    async fn find_counterpart(
        &self,
        filename: &FileName,
        folder: &FolderId,
    ) -> std::result::Result<Option<Counterpart>, UploadError> {
        let query = ObjectQuery::counterpart(filename.as_str(), folder.clone());
        let mut found = self
            .remote
            .list(&query)
            .await
            .map_err(|e| UploadError::remote(&e))?;

        found.sort_by(|a, b| a.id.cmp(&b.id));
        if found.len() > 1 {
            warn!(
                file = %filename,
                count = found.len(),
                "Multiple remote files share this name; using the lowest id"
            );
        }

        match found.into_iter().next() {
            None => Ok(None),
            Some(object) => {
                let modified = object.modified_stamp();
                let id = FileId::new(object.id)
                    .map_err(|_| UploadError::Remote("Backend returned an empty id".to_string()))?;
                Ok(Some(Counterpart { id, modified }))
            }
        }
    }

    /// Builds the metadata payload shared by creates and overwrites
    fn file_metadata(&self, filename: &FileName, local: ModifiedStamp) -> ObjectMetadata {
        ObjectMetadata::file(filename.as_str(), local)
            .with_mime_type(self.config.mime_type.clone())
            .with_description(self.config.description.clone())
    }

    async fn execute_create(
        &self,
        filename: &FileName,
        path: &PathBuf,
        local: ModifiedStamp,
        folder: &FolderId,
    ) -> Outcome {
        let content = match self.local.read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return Outcome::Failed {
                    error: UploadError::local(
                        &e.context(format!("Failed to read {}", path.display())),
                    ),
                }
            }
        };

        // The root sentinel means backend-default placement: no parent.
        let parent = (!folder.is_root()).then(|| folder.clone());
        let mut metadata = self.file_metadata(filename, local).with_parent(parent);
        if self.config.protect {
            metadata = metadata.with_protection();
        }

        match self.remote.create(&metadata, Some(&content)).await {
            Ok(object) => match FileId::new(object.id) {
                Ok(id) => {
                    info!(file = %filename, id = %id, "File uploaded");
                    Outcome::Created {
                        id,
                        modified: local,
                    }
                }
                Err(_) => Outcome::Failed {
                    error: UploadError::Remote("Backend returned an empty id".to_string()),
                },
            },
            Err(e) => Outcome::Failed {
                error: UploadError::remote(&e.context("Create request failed")),
            },
        }
    }

    async fn execute_overwrite(
        &self,
        filename: &FileName,
        path: &PathBuf,
        local: ModifiedStamp,
        id: FileId,
    ) -> Outcome {
        let content = match self.local.read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return Outcome::Failed {
                    error: UploadError::local(
                        &e.context(format!("Failed to read {}", path.display())),
                    ),
                }
            }
        };

        // The protection tag is only ever written at create time.
        let metadata = self.file_metadata(filename, local);

        match self.remote.update(&id, &metadata, Some(&content)).await {
            Ok(_) => {
                info!(file = %filename, id = %id, "File updated");
                Outcome::Updated {
                    id,
                    modified: local,
                }
            }
            Err(e) => Outcome::Failed {
                error: UploadError::remote(&e.context("Update request failed")),
            },
        }
    }
}

/// Splits the base name off a file specifier
fn file_name_of(spec: &str) -> std::result::Result<FileName, UploadError> {
    let base = std::path::Path::new(spec)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| UploadError::Local(format!("'{spec}' has no file name")))?;
    FileName::new(base).map_err(|e| UploadError::Local(e.to_string()))
}
