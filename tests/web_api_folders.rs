//! Web API folder tests: tree, folder creation, content listing, upload.

mod common;

use axum::http::{header::AUTHORIZATION, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use serde_json::Value;

use common::{create_test_app, register_and_token, root_id};

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

#[tokio::test]
async fn test_create_folder_and_list_content() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;
    let root = root_id(&app.server, &token).await;

    let created = app
        .server
        .post(&format!("/folder/{}/new/docs", root))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    created.assert_status(StatusCode::OK);
    let created_body = created.json::<Value>();
    assert_eq!(created_body["data"]["name"], "docs");
    assert_eq!(created_body["data"]["kind"], "folder");

    let content = app
        .server
        .get(&format!("/folder/{}/content", root))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    content.assert_status(StatusCode::OK);
    let content_body = content.json::<Value>();
    let entries = content_body["data"]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "docs");
}

#[tokio::test]
async fn test_create_folder_duplicate_name_conflicts() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;
    let root = root_id(&app.server, &token).await;

    app.server
        .post(&format!("/folder/{}/new/docs", root))
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::OK);

    // Case-insensitive sibling uniqueness.
    let dup = app
        .server
        .post(&format!("/folder/{}/new/DOCS", root))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    dup.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_folder_under_missing_parent() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;

    app.server
        .post("/folder/no-such-id/new/docs")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tree_is_deterministic() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;
    let root = root_id(&app.server, &token).await;

    for name in ["zebra", "Apple", "mango"] {
        app.server
            .post(&format!("/folder/{}/new/{}", root, name))
            .add_header(AUTHORIZATION, bearer(&token))
            .await
            .assert_status(StatusCode::OK);
    }

    let first = app
        .server
        .get("/folder/tree")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json::<Value>();
    let second = app
        .server
        .get("/folder/tree")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json::<Value>();

    assert_eq!(first, second);
    let names: Vec<&str> = first["data"]["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Apple", "mango", "zebra"]);
}

#[tokio::test]
async fn test_upload_files_into_folder() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;
    let root = root_id(&app.server, &token).await;

    let form = MultipartForm::new()
        .add_part(
            "files",
            Part::bytes(b"hello".to_vec())
                .file_name("hello.txt")
                .mime_type("text/plain"),
        )
        .add_part(
            "files",
            Part::bytes(vec![0u8, 1, 2, 3])
                .file_name("data.bin")
                .mime_type("application/octet-stream"),
        );

    let response = app
        .server
        .post(&format!("/folder/{}/upload", root))
        .add_header(AUTHORIZATION, bearer(&token))
        .multipart(form)
        .await;
    response.assert_status(StatusCode::OK);

    let body = response.json::<Value>();
    let stored = body["data"].as_array().unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0]["name"], "hello.txt");
    assert_eq!(stored[0]["size"], 5);
    assert_eq!(stored[1]["name"], "data.bin");
}

#[tokio::test]
async fn test_upload_collision_auto_renames() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;
    let root = root_id(&app.server, &token).await;

    for expected in ["a.txt", "a (2).txt"] {
        let form = MultipartForm::new().add_part(
            "files",
            Part::bytes(b"x".to_vec())
                .file_name("a.txt")
                .mime_type("text/plain"),
        );
        let response = app
            .server
            .post(&format!("/folder/{}/upload", root))
            .add_header(AUTHORIZATION, bearer(&token))
            .multipart(form)
            .await;
        response.assert_status(StatusCode::OK);
        assert_eq!(response.json::<Value>()["data"][0]["name"], expected);
    }
}

#[tokio::test]
async fn test_serve_in_returns_containing_folder() {
    let app = create_test_app().await;
    let token = register_and_token(&app.server, "alice").await;
    let root = root_id(&app.server, &token).await;

    let docs = app
        .server
        .post(&format!("/folder/{}/new/docs", root))
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json::<Value>();
    let docs_id = docs["data"]["id"].as_str().unwrap();

    let form = MultipartForm::new().add_part(
        "files",
        Part::bytes(b"hi".to_vec())
            .file_name("inside.txt")
            .mime_type("text/plain"),
    );
    let uploaded = app
        .server
        .post(&format!("/folder/{}/upload", docs_id))
        .add_header(AUTHORIZATION, bearer(&token))
        .multipart(form)
        .await
        .json::<Value>();
    let file_id = uploaded["data"][0]["id"].as_str().unwrap();

    let response = app
        .server
        .get(&format!("/folder/serveIn/{}", file_id))
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["data"]["id"], *docs_id);
    assert_eq!(body["data"]["entries"][0]["name"], "inside.txt");
}

#[tokio::test]
async fn test_cross_owner_folder_is_not_found() {
    let app = create_test_app().await;
    let alice = register_and_token(&app.server, "alice").await;
    let bob = register_and_token(&app.server, "bob").await;
    let alice_root = root_id(&app.server, &alice).await;

    app.server
        .get(&format!("/folder/{}/content", alice_root))
        .add_header(AUTHORIZATION, bearer(&bob))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.server
        .post(&format!("/folder/{}/new/sneaky", alice_root))
        .add_header(AUTHORIZATION, bearer(&bob))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
