//! Integration tests for drivepush-gdrive
//!
//! Uses wiremock to simulate the Google Drive API and verifies end-to-end
//! behavior of the DriveClient, file search and upload operations, and the
//! full upload engine running against the Drive adapter.

mod common;

mod test_engine;
mod test_files;
