//! Port definitions (trait interfaces) for the hexagonal architecture
//!
//! Ports are the boundaries between the core and the adapters:
//! - [`remote_store::IRemoteStore`] - the remote object-storage backend
//! - [`local_files::ILocalFiles`] - local filesystem reads and stat

pub mod local_files;
pub mod remote_store;

pub use local_files::ILocalFiles;
pub use remote_store::{IRemoteStore, ObjectKind, ObjectMetadata, ObjectQuery, RemoteObject};
