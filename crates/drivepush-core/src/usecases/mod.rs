//! Use cases orchestrating the domain through port interfaces
//!
//! - [`resolve_folder::ResolveFolderUseCase`] - find-or-create the target folder
//! - [`upload_files::UploadFilesUseCase`] - the upload decision engine

pub mod resolve_folder;
pub mod upload_files;

pub use resolve_folder::ResolveFolderUseCase;
pub use upload_files::UploadFilesUseCase;
