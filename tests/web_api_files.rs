//! Web API file tests: details, rename, download, archive, move, delete.

mod common;

use std::io::{Cursor, Read};

use axum::http::{header::AUTHORIZATION, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::{json, Value};
use zip::ZipArchive;

use common::{create_test_app, register_and_token, root_id};

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

async fn create_folder(server: &TestServer, token: &str, parent: &str, name: &str) -> String {
    let response = server
        .post(&format!("/folder/{}/new/{}", parent, name))
        .add_header(AUTHORIZATION, bearer(token))
        .await;
    response.assert_status(StatusCode::OK);
    response.json::<Value>()["data"]["id"]
        .as_str()
        .expect("missing folder id")
        .to_string()
}

async fn upload_file(
    server: &TestServer,
    token: &str,
    folder: &str,
    name: &str,
    content: &[u8],
) -> String {
    let form = MultipartForm::new().add_part(
        "files",
        Part::bytes(content.to_vec())
            .file_name(name)
            .mime_type("application/octet-stream"),
    );
    let response = server
        .post(&format!("/folder/{}/upload", folder))
        .add_header(AUTHORIZATION, bearer(token))
        .multipart(form)
        .await;
    response.assert_status(StatusCode::OK);
    response.json::<Value>()["data"][0]["id"]
        .as_str()
        .expect("missing uploaded file id")
        .to_string()
}

#[tokio::test]
async fn test_file_details_include_path() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;
    let root = root_id(&app.server, &token).await;
    let docs = create_folder(&app.server, &token, &root, "docs").await;
    let file = upload_file(&app.server, &token, &docs, "report.txt", b"hello").await;

    let response = app
        .server
        .get(&format!("/file/details/{}", file))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["data"]["name"], "report.txt");
    assert_eq!(body["data"]["path"], "/docs/report.txt");
    assert_eq!(body["data"]["size"], 5);
    assert!(body["data"].get("element_count").is_none());
}

#[tokio::test]
async fn test_folder_details_count_children() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;
    let root = root_id(&app.server, &token).await;
    let docs = create_folder(&app.server, &token, &root, "docs").await;
    upload_file(&app.server, &token, &docs, "a.txt", b"a").await;
    create_folder(&app.server, &token, &docs, "sub").await;

    let body = app
        .server
        .get(&format!("/file/details/{}", docs))
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json::<Value>();
    assert_eq!(body["data"]["element_count"], 2);
    assert_eq!(body["data"]["path"], "/docs");
}

#[tokio::test]
async fn test_rename_file() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;
    let root = root_id(&app.server, &token).await;
    let file = upload_file(&app.server, &token, &root, "old.txt", b"x").await;

    let response = app
        .server
        .post(&format!("/file/{}/rename/new.txt", file))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["data"]["name"], "new.txt");
}

#[tokio::test]
async fn test_rename_unresolvable_returns_no_content() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;

    let response = app
        .server
        .post("/file/no-such-id/rename/whatever")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_rename_collision_conflicts_without_mutation() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;
    let root = root_id(&app.server, &token).await;
    upload_file(&app.server, &token, &root, "taken.txt", b"a").await;
    let file = upload_file(&app.server, &token, &root, "free.txt", b"b").await;

    let response = app
        .server
        .post(&format!("/file/{}/rename/TAKEN.txt", file))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    // The record keeps its old name.
    let details = app
        .server
        .get(&format!("/file/details/{}", file))
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json::<Value>();
    assert_eq!(details["data"]["name"], "free.txt");
}

#[tokio::test]
async fn test_download_file_content_and_headers() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;
    let root = root_id(&app.server, &token).await;
    let file = upload_file(&app.server, &token, &root, "notes.txt", b"line one").await;

    let response = app
        .server
        .get(&format!("/file/download/{}", file))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.as_bytes().as_ref(), b"line one");

    let disposition = response
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("notes.txt"), "{}", disposition);
}

#[tokio::test]
async fn test_download_folder_or_missing_returns_no_content() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;
    let root = root_id(&app.server, &token).await;
    let docs = create_folder(&app.server, &token, &root, "docs").await;

    app.server
        .get(&format!("/file/download/{}", docs))
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .get("/file/download/no-such-id")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_archive_download_round_trip() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;
    let root = root_id(&app.server, &token).await;
    let docs = create_folder(&app.server, &token, &root, "docs").await;
    let sub = create_folder(&app.server, &token, &docs, "sub").await;
    upload_file(&app.server, &token, &docs, "a.txt", b"alpha").await;
    upload_file(&app.server, &token, &sub, "b.txt", b"beta").await;
    let loose = upload_file(&app.server, &token, &root, "loose.txt", b"loose").await;

    let response = app
        .server
        .get(&format!("/files/download?fileIds={},{}", docs, loose))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/zip")
    );

    let bytes = response.as_bytes().to_vec();
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("invalid zip");
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec!["docs/", "docs/a.txt", "docs/sub/", "docs/sub/b.txt", "loose.txt"]
    );

    let mut content = String::new();
    archive
        .by_name("docs/sub/b.txt")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "beta");
}

#[tokio::test]
async fn test_archive_single_folder_names_zip_after_it() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;
    let root = root_id(&app.server, &token).await;
    let docs = create_folder(&app.server, &token, &root, "docs").await;
    upload_file(&app.server, &token, &docs, "a.txt", b"alpha").await;

    let response = app
        .server
        .get(&format!("/files/download?fileIds={}", docs))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::OK);
    let disposition = response
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("docs.zip"), "{}", disposition);
}

#[tokio::test]
async fn test_archive_with_nothing_resolvable_returns_no_content() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;

    app.server
        .get("/files/download?fileIds=ghost-1,ghost-2")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .get("/files/download?fileIds=")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_move_files_between_folders() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;
    let root = root_id(&app.server, &token).await;
    let src = create_folder(&app.server, &token, &root, "src").await;
    let dest = create_folder(&app.server, &token, &root, "dest").await;
    let file = upload_file(&app.server, &token, &src, "move-me.txt", b"m").await;
    // Not a child of src, must be skipped.
    let outsider = upload_file(&app.server, &token, &root, "outsider.txt", b"o").await;

    let response = app
        .server
        .post("/files/move")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "srcId": src,
            "destId": dest,
            "fileIds": [file, outsider],
        }))
        .await;
    response.assert_status(StatusCode::OK);
    let moved = response.json::<Value>()["data"]
        .as_array()
        .expect("moved list")
        .len();
    assert_eq!(moved, 1);

    let details = app
        .server
        .get(&format!("/file/details/{}", file))
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json::<Value>();
    assert_eq!(details["data"]["path"], "/dest/move-me.txt");
}

#[tokio::test]
async fn test_move_into_own_subtree_conflicts() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;
    let root = root_id(&app.server, &token).await;
    let outer = create_folder(&app.server, &token, &root, "outer").await;
    let inner = create_folder(&app.server, &token, &outer, "inner").await;

    let response = app
        .server
        .post("/files/move")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "srcId": root,
            "destId": inner,
            "fileIds": [outer],
        }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    // Tree unchanged.
    let details = app
        .server
        .get(&format!("/file/details/{}", inner))
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json::<Value>();
    assert_eq!(details["data"]["path"], "/outer/inner");
}

#[tokio::test]
async fn test_move_name_collision_aborts_whole_batch() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;
    let root = root_id(&app.server, &token).await;
    let src = create_folder(&app.server, &token, &root, "src").await;
    let dest = create_folder(&app.server, &token, &root, "dest").await;
    let clean = upload_file(&app.server, &token, &src, "clean.txt", b"c").await;
    let clash = upload_file(&app.server, &token, &src, "clash.txt", b"s").await;
    upload_file(&app.server, &token, &dest, "clash.txt", b"d").await;

    let response = app
        .server
        .post("/files/move")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "srcId": src,
            "destId": dest,
            "fileIds": [clean, clash],
        }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    // Nothing moved, including the record without a collision.
    let details = app
        .server
        .get(&format!("/file/details/{}", clean))
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json::<Value>();
    assert_eq!(details["data"]["path"], "/src/clean.txt");
}

#[tokio::test]
async fn test_delete_files_reports_deleted_and_skipped() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;
    let root = root_id(&app.server, &token).await;
    let file = upload_file(&app.server, &token, &root, "gone.txt", b"g").await;

    let response = app
        .server
        .delete("/files/delete")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "fileIds": [file, "ghost", root] }))
        .await;
    response.assert_status(StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["data"]["deleted"], json!([file]));
    let skipped = body["data"]["skipped"].as_array().unwrap();
    assert_eq!(skipped.len(), 2);

    app.server
        .get(&format!("/file/details/{}", file))
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_folder_removes_subtree() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;
    let root = root_id(&app.server, &token).await;
    let docs = create_folder(&app.server, &token, &root, "docs").await;
    let sub = create_folder(&app.server, &token, &docs, "sub").await;
    let nested = upload_file(&app.server, &token, &sub, "deep.txt", b"d").await;

    let response = app
        .server
        .delete("/files/delete")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "fileIds": [docs] }))
        .await;
    response.assert_status(StatusCode::OK);

    for id in [&docs, &sub, &nested] {
        app.server
            .get(&format!("/file/details/{}", id))
            .add_header(AUTHORIZATION, bearer(&token))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_cross_owner_file_access_is_not_found() {
    let app = create_test_app().await;
    let alice = register_and_token(&app.server, "alice").await;
    let bob = register_and_token(&app.server, "bob").await;
    let alice_root = root_id(&app.server, &alice).await;
    let secret = upload_file(&app.server, &alice, &alice_root, "secret.txt", b"s").await;

    app.server
        .get(&format!("/file/details/{}", secret))
        .add_header(AUTHORIZATION, bearer(&bob))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // Unresolvable for another owner, so the rename contract answers 204.
    app.server
        .post(&format!("/file/{}/rename/stolen.txt", secret))
        .add_header(AUTHORIZATION, bearer(&bob))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    // And the owner still sees the original name.
    let details = app
        .server
        .get(&format!("/file/details/{}", secret))
        .add_header(AUTHORIZATION, bearer(&alice))
        .await
        .json::<Value>();
    assert_eq!(details["data"]["name"], "secret.txt");
}
