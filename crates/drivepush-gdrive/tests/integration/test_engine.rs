//! End-to-end tests: upload engine running against the Drive adapter
//!
//! Drives [`UploadFilesUseCase`] with a [`DriveRemoteStore`] pointed at a
//! wiremock server, verifying that engine decisions turn into exactly the
//! expected Drive API traffic.

use std::sync::Arc;

use drivepush_core::config::{Mode, UploadConfig};
use drivepush_core::domain::Outcome;
use drivepush_core::usecases::UploadFilesUseCase;
use drivepush_gdrive::store::DriveRemoteStore;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{self, FixedLocalFiles};

fn engine(store: DriveRemoteStore, local: Arc<FixedLocalFiles>, config: UploadConfig) -> UploadFilesUseCase {
    UploadFilesUseCase::new(Arc::new(store), local, config)
}

#[tokio::test]
async fn test_push_new_file_to_root() {
    let (server, client) = common::setup_drive_mock().await;

    common::mount_search(&server, &common::counterpart_query("save.bin", "root"), vec![]).await;

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(query_param("uploadType", "multipart"))
        .and(body_string_contains("\"modified\":\"1000\""))
        .and(body_string_contains("payload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::drive_file_json(
            "f-new",
            "save.bin",
            Some(1000),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let local = Arc::new(FixedLocalFiles::new());
    local.insert("save.bin", 1000, b"payload");

    let config = UploadConfig::from_list_str("save.bin", "root", Mode::Normal);
    let report = engine(DriveRemoteStore::new(client), local, config)
        .run()
        .await
        .expect("Batch failed");

    assert_eq!(report.reports.len(), 1);
    assert!(matches!(report.reports[0].outcome, Outcome::Created { .. }));

    // Root uploads carry no parents array.
    let requests = server.received_requests().await.unwrap();
    let post = requests.iter().find(|r| r.method.as_str() == "POST").unwrap();
    assert!(!String::from_utf8_lossy(&post.body).contains("parents"));
}

#[tokio::test]
async fn test_push_resolves_folder_then_uploads_into_it() {
    let (server, client) = common::setup_drive_mock().await;

    common::mount_search(
        &server,
        &common::folder_query("backups"),
        vec![serde_json::json!({
            "id": "folder-1",
            "name": "backups",
            "mimeType": "application/vnd.google-apps.folder"
        })],
    )
    .await;
    common::mount_search(
        &server,
        &common::counterpart_query("save.bin", "folder-1"),
        vec![],
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(query_param("uploadType", "multipart"))
        .and(body_string_contains("\"parents\":[\"folder-1\"]"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::drive_file_json(
            "f-new",
            "save.bin",
            Some(1000),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let local = Arc::new(FixedLocalFiles::new());
    local.insert("save.bin", 1000, b"payload");

    let config = UploadConfig::from_list_str("save.bin", "backups", Mode::Normal);
    let report = engine(DriveRemoteStore::new(client), local, config)
        .run()
        .await
        .expect("Batch failed");

    assert!(matches!(report.reports[0].outcome, Outcome::Created { .. }));
}

#[tokio::test]
async fn test_push_skips_when_remote_newer() {
    let (server, client) = common::setup_drive_mock().await;

    common::mount_search(
        &server,
        &common::counterpart_query("save.bin", "root"),
        vec![common::drive_file_json("f1", "save.bin", Some(9000))],
    )
    .await;

    // Any write request would be an engine bug.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let local = Arc::new(FixedLocalFiles::new());
    local.insert("save.bin", 1000, b"payload");

    let config = UploadConfig::from_list_str("save.bin", "root", Mode::Normal);
    let report = engine(DriveRemoteStore::new(client), local, config)
        .run()
        .await
        .expect("Batch failed");

    assert!(matches!(
        report.reports[0].outcome,
        Outcome::SkippedRemoteNewer { .. }
    ));
}

#[tokio::test]
async fn test_check_only_sends_no_writes() {
    let (server, client) = common::setup_drive_mock().await;

    common::mount_search(
        &server,
        &common::counterpart_query("save.bin", "root"),
        vec![common::drive_file_json("f1", "save.bin", Some(500))],
    )
    .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let local = Arc::new(FixedLocalFiles::new());
    local.insert("save.bin", 1000, b"payload");

    let config = UploadConfig::from_list_str("save.bin", "root", Mode::CheckOnly);
    let report = engine(DriveRemoteStore::new(client), local, config)
        .run()
        .await
        .expect("Batch failed");

    assert!(matches!(
        report.reports[0].outcome,
        Outcome::WouldUpdate { .. }
    ));
}

#[tokio::test]
async fn test_force_overwrites_newer_counterpart() {
    let (server, client) = common::setup_drive_mock().await;

    common::mount_search(
        &server,
        &common::counterpart_query("save.bin", "root"),
        vec![common::drive_file_json("f1", "save.bin", Some(9000))],
    )
    .await;

    Mock::given(method("PATCH"))
        .and(path("/files/f1"))
        .and(query_param("uploadType", "multipart"))
        .and(body_string_contains("\"modified\":\"1000\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::drive_file_json(
            "f1",
            "save.bin",
            Some(1000),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let local = Arc::new(FixedLocalFiles::new());
    local.insert("save.bin", 1000, b"payload");

    let config = UploadConfig::from_list_str("save.bin", "root", Mode::Force);
    let report = engine(DriveRemoteStore::new(client), local, config)
        .run()
        .await
        .expect("Batch failed");

    assert!(matches!(report.reports[0].outcome, Outcome::Updated { .. }));
}

#[tokio::test]
async fn test_remote_failure_is_isolated_per_file() {
    let (server, client) = common::setup_drive_mock().await;

    common::mount_search(&server, &common::counterpart_query("bad.bin", "root"), vec![]).await;
    common::mount_search(&server, &common::counterpart_query("good.bin", "root"), vec![]).await;

    // The first upload blows up server-side, the second succeeds.
    Mock::given(method("POST"))
        .and(path("/files"))
        .and(body_string_contains("bad.bin"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/files"))
        .and(body_string_contains("good.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::drive_file_json(
            "f-good",
            "good.bin",
            Some(1000),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let local = Arc::new(FixedLocalFiles::new());
    local.insert("bad.bin", 1000, b"payload");
    local.insert("good.bin", 1000, b"payload");

    let config = UploadConfig::from_list_str("bad.bin,good.bin", "root", Mode::Normal);
    let report = engine(DriveRemoteStore::new(client), local, config)
        .run()
        .await
        .expect("Batch failed");

    assert_eq!(report.reports.len(), 2);
    assert!(report.reports[0].outcome.is_failure());
    assert!(matches!(report.reports[1].outcome, Outcome::Created { .. }));
}
