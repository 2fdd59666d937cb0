//! Router configuration for the Web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::record::FolderTreeNode;

use super::dto::{
    DeleteFilesRequest, DeleteReportResponse, FileDetailsResponse, FileRecordResponse,
    FolderContentResponse, LoginRequest, LoginResponse, MeResponse, MoveFilesRequest,
    RegisterRequest, UserInfo,
};
use super::handlers::{
    self, create_folder, delete_files, download_file, download_files, file_details,
    folder_content, folder_tree, login, me, move_files, register, rename_file, serve_in,
    upload_files, AppState,
};
use super::middleware::{create_cors_layer, jwt_auth, JwtState};

/// OpenAPI documentation for the API.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::file::file_details,
        handlers::file::rename_file,
        handlers::file::download_file,
        handlers::file::download_files,
        handlers::file::move_files,
        handlers::file::delete_files,
        handlers::folder::folder_tree,
        handlers::folder::create_folder,
        handlers::folder::folder_content,
        handlers::folder::serve_in,
        handlers::folder::upload_files,
    ),
    components(schemas(
        LoginRequest,
        RegisterRequest,
        MoveFilesRequest,
        DeleteFilesRequest,
        LoginResponse,
        UserInfo,
        MeResponse,
        FileRecordResponse,
        FileDetailsResponse,
        FolderContentResponse,
        DeleteReportResponse,
        FolderTreeNode,
        crate::record::RecordKind,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication"),
        (name = "files", description = "File operations"),
        (name = "folders", description = "Folder operations")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    cors_origins: &[String],
) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/me", get(me));

    // Endpoint paths preserved from the public contract. Parameter names
    // must stay consistent per position for the route matcher.
    let file_routes = Router::new()
        .route("/file/details/:file_id", get(file_details))
        .route("/file/download/:file_id", get(download_file))
        .route("/file/:file_id/rename/:new_name", post(rename_file))
        .route("/files/download", get(download_files))
        .route("/files/move", post(move_files))
        .route("/files/delete", delete(delete_files))
        .route("/folder/tree", get(folder_tree))
        .route("/folder/serveIn/:file_id", get(serve_in))
        .route("/folder/:folder_id/content", get(folder_content))
        .route("/folder/:folder_id/new/:new_folder_name", post(create_folder))
        .route("/folder/:folder_id/upload", post(upload_files));

    // Uploads may carry several files; leave headroom above the per-file cap.
    let body_limit = app_state.max_upload_size as usize * 4 + 1024 * 1024;

    let jwt_state_for_middleware = jwt_state.clone();

    Router::new()
        .nest("/auth", auth_routes)
        .merge(file_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Create the Swagger UI router.
pub fn create_swagger_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
