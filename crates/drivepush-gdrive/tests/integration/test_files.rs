//! Integration tests for Drive file search and upload operations
//!
//! Verifies the wire shape of searches, multipart uploads, and metadata
//! writes against a wiremock-based Drive API mock server.

use drivepush_core::domain::newtypes::{FileId, FolderId, ModifiedStamp};
use drivepush_core::ports::remote_store::{ObjectMetadata, ObjectQuery};
use drivepush_gdrive::{client::DriveClient, files, DriveError};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

// ============================================================================
// Search tests
// ============================================================================

#[tokio::test]
async fn test_list_sends_expected_query() {
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

    let found = files::list_objects(&client, &ObjectQuery::folder("backups"))
        .await
        .expect("Search failed");

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "folder-1");
    assert_eq!(found[0].name, "backups");
}

#[tokio::test]
async fn test_list_parses_modified_property() {
    let (server, client) = common::setup_drive_mock().await;

    common::mount_search(
        &server,
        &common::counterpart_query("save.bin", "folder-1"),
        vec![common::drive_file_json("f1", "save.bin", Some(1700000000))],
    )
    .await;

    let query = ObjectQuery::counterpart("save.bin", FolderId::new("folder-1").unwrap());
    let found = files::list_objects(&client, &query).await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(
        found[0].modified_stamp(),
        Some(ModifiedStamp::from_unix_seconds(1700000000))
    );
}

#[tokio::test]
async fn test_list_empty_result() {
    let (server, client) = common::setup_drive_mock().await;

    common::mount_search(&server, &common::folder_query("nothing"), vec![]).await;

    let found = files::list_objects(&client, &ObjectQuery::folder("nothing"))
        .await
        .unwrap();
    assert!(found.is_empty());
}

// ============================================================================
// Create tests
// ============================================================================

#[tokio::test]
async fn test_create_folder_is_metadata_only() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(body_string_contains("application/vnd.google-apps.folder"))
        .and(body_string_contains("\"name\":\"backups\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "folder-new",
            "name": "backups",
            "mimeType": "application/vnd.google-apps.folder"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = files::create_object(&client, &ObjectMetadata::folder("backups"), None)
        .await
        .expect("Folder create failed");

    assert_eq!(created.id, "folder-new");
}

#[tokio::test]
async fn test_create_file_uses_multipart_related() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(query_param("uploadType", "multipart"))
        .and(body_string_contains("\"name\":\"save.bin\""))
        .and(body_string_contains("\"modified\":\"1000\""))
        .and(body_string_contains("file payload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::drive_file_json(
            "f-new",
            "save.bin",
            Some(1000),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let metadata = ObjectMetadata::file("save.bin", ModifiedStamp::from_unix_seconds(1000))
        .with_parent(Some(FolderId::new("folder-1").unwrap()));
    let created = files::create_object(&client, &metadata, Some(b"file payload"))
        .await
        .expect("Upload failed");

    assert_eq!(created.id, "f-new");
}

#[tokio::test]
async fn test_create_with_protection_sends_tag() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(query_param("uploadType", "multipart"))
        .and(body_string_contains("\"no_overwrite\":\"true\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::drive_file_json(
            "f-new",
            "save.bin",
            Some(1000),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let metadata = ObjectMetadata::file("save.bin", ModifiedStamp::from_unix_seconds(1000))
        .with_protection();
    files::create_object(&client, &metadata, Some(b"payload"))
        .await
        .expect("Upload failed");
}

// ============================================================================
// Update tests
// ============================================================================

#[tokio::test]
async fn test_update_patches_content_and_stamp() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("PATCH"))
        .and(path("/files/f1"))
        .and(query_param("uploadType", "multipart"))
        .and(body_string_contains("\"modified\":\"2000\""))
        .and(body_string_contains("new payload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::drive_file_json(
            "f1",
            "save.bin",
            Some(2000),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let metadata = ObjectMetadata::file("save.bin", ModifiedStamp::from_unix_seconds(2000));
    let updated = files::update_object(
        &client,
        &FileId::new("f1").unwrap(),
        &metadata,
        Some(b"new payload"),
    )
    .await
    .expect("Update failed");

    assert_eq!(updated.id, "f1");
    assert_eq!(
        updated.modified_stamp(),
        Some(ModifiedStamp::from_unix_seconds(2000))
    );
}

#[tokio::test]
async fn test_update_never_sends_parents() {
    let (server, client) = common::setup_drive_mock().await;

    // Any body mentioning parents would fail the Drive API; the mock only
    // matches bodies without it.
    Mock::given(method("PATCH"))
        .and(path("/files/f1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::drive_file_json(
            "f1",
            "save.bin",
            Some(1000),
        )))
        .mount(&server)
        .await;

    let metadata = ObjectMetadata::file("save.bin", ModifiedStamp::from_unix_seconds(1000))
        .with_parent(Some(FolderId::new("folder-1").unwrap()));
    files::update_object(&client, &FileId::new("f1").unwrap(), &metadata, Some(b"x"))
        .await
        .expect("Update failed");

    let requests = server.received_requests().await.unwrap();
    let patch = requests
        .iter()
        .find(|r| r.method.as_str() == "PATCH")
        .expect("no PATCH request recorded");
    let body = String::from_utf8_lossy(&patch.body);
    assert!(!body.contains("parents"));
}

// ============================================================================
// Trash and error handling tests
// ============================================================================

#[tokio::test]
async fn test_trash_patches_trashed_flag() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("PATCH"))
        .and(path("/files/f1"))
        .and(body_string_contains("\"trashed\":true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    files::trash_object(&client, &FileId::new("f1").unwrap())
        .await
        .expect("Trash failed");
}

#[tokio::test]
async fn test_unauthorized_maps_to_drive_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": { "code": 401, "message": "Invalid Credentials" }
        })))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_url("stale-token", server.uri());
    let result = files::list_objects(&client, &ObjectQuery::folder("backups")).await;

    let err = result.expect_err("401 should fail");
    assert!(matches!(
        err.downcast_ref::<DriveError>(),
        Some(DriveError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_server_error_maps_to_drive_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
        .mount(&server)
        .await;

    let client = DriveClient::with_base_url("token", server.uri());
    let err = files::list_objects(&client, &ObjectQuery::folder("backups"))
        .await
        .expect_err("503 should fail");
    assert!(matches!(
        err.downcast_ref::<DriveError>(),
        Some(DriveError::ServerError(_))
    ));
}

// ============================================================================
// User info
// ============================================================================

#[tokio::test]
async fn test_get_user_info() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .and(query_param("fields", "user,storageQuota"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "user": {
                "displayName": "Test User",
                "emailAddress": "test@example.com",
                "permissionId": "perm-001"
            },
            "storageQuota": {
                "limit": "16106127360",
                "usage": "1073741824"
            }
        })))
        .mount(&server)
        .await;

    let info = client.get_user_info().await.expect("About failed");
    assert_eq!(info.email, "test@example.com");
    assert_eq!(info.display_name, "Test User");
    assert_eq!(info.quota_used, 1073741824);
    assert_eq!(info.quota_total, 16106127360);
}
