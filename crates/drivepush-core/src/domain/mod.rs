//! Domain layer - pure business types with no I/O
//!
//! Contains validated newtypes, the upload error taxonomy, and the
//! per-file outcome/report types produced by the decision engine.

pub mod errors;
pub mod newtypes;
pub mod outcome;

pub use errors::{DomainError, UploadError};
pub use newtypes::{FileId, FileName, FolderId, ModifiedStamp};
pub use outcome::{BatchReport, FileReport, Outcome};
