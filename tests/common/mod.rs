//! Shared helpers for Web API integration tests.

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use cabinet::record::FileStorage;
use cabinet::web::handlers::AppState;
use cabinet::web::middleware::JwtState;
use cabinet::web::router::{create_health_router, create_router};
use cabinet::Database;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-testing-only";
pub const TEST_MAX_UPLOAD: u64 = 2 * 1024 * 1024;

/// A running test server with its backing state.
pub struct TestApp {
    pub server: TestServer,
    #[allow(dead_code)]
    pub db: Arc<Database>,
    #[allow(dead_code)]
    pub storage: FileStorage,
    _storage_dir: TempDir,
}

/// Create a test server over an in-memory database and temp blob storage.
pub async fn create_test_app() -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    db.migrate().await.expect("Failed to migrate test database");
    let db = Arc::new(db);

    let storage_dir = TempDir::new().expect("Failed to create storage dir");
    let storage = FileStorage::new(storage_dir.path()).expect("Failed to create storage");

    let app_state = Arc::new(AppState::new(
        db.clone(),
        storage.clone(),
        TEST_JWT_SECRET,
        900,
        TEST_MAX_UPLOAD,
    ));
    let jwt_state = Arc::new(JwtState::new(TEST_JWT_SECRET));

    let router =
        create_router(app_state, jwt_state, &[]).merge(create_health_router());
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        db,
        storage,
        _storage_dir: storage_dir,
    }
}

/// Register a user and return the registration response body.
pub async fn register_user(server: &TestServer, username: &str) -> Value {
    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": username,
            "password": "correct-horse-battery",
        }))
        .await;

    response.json::<Value>()
}

/// Get the access token from a register/login response.
pub fn access_token(response: &Value) -> String {
    response["data"]["access_token"]
        .as_str()
        .expect("missing access_token")
        .to_string()
}

/// Get the user ID from a register/login response.
#[allow(dead_code)]
pub fn user_id(response: &Value) -> i64 {
    response["data"]["user"]["id"]
        .as_i64()
        .expect("missing user id")
}

/// Register a user and return their bearer token.
pub async fn register_and_token(server: &TestServer, username: &str) -> String {
    access_token(&register_user(server, username).await)
}

/// Fetch the user's root folder ID via the tree endpoint.
pub async fn root_id(server: &TestServer, token: &str) -> String {
    let response = server
        .get("/folder/tree")
        .add_header(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {}", token),
        )
        .await;
    let body = response.json::<Value>();
    body["data"]["id"]
        .as_str()
        .expect("missing tree root id")
        .to_string()
}
