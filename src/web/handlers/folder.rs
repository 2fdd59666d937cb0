//! Folder handlers for the Web API.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use utoipa;

use crate::record::{FolderTreeNode, IncomingFile};
use crate::web::dto::{ApiResponse, FileRecordResponse, FolderContentResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// GET /folder/tree - The user's complete folder tree.
#[utoipa::path(
    get,
    path = "/folder/tree",
    tag = "folders",
    responses(
        (status = 200, description = "Nested folder tree", body = FolderTreeNode),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn folder_tree(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<FolderTreeNode>>, ApiError> {
    let tree = state.file_service().tree(claims.sub).await?;
    Ok(Json(ApiResponse::new(tree)))
}

/// POST /folder/:parentFolderId/new/:newFolderName - Create a folder.
#[utoipa::path(
    post,
    path = "/folder/{folder_id}/new/{new_folder_name}",
    tag = "folders",
    params(
        ("folder_id" = String, Path, description = "Parent folder ID"),
        ("new_folder_name" = String, Path, description = "Name for the new folder")
    ),
    responses(
        (status = 200, description = "Created folder", body = FileRecordResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Parent folder not found"),
        (status = 409, description = "Name already taken among siblings"),
        (status = 422, description = "Invalid name")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path((folder_id, new_folder_name)): Path<(String, String)>,
) -> Result<Json<ApiResponse<FileRecordResponse>>, ApiError> {
    let folder = state
        .file_service()
        .create_folder(claims.sub, &folder_id, &new_folder_name)
        .await?;

    Ok(Json(ApiResponse::new(folder.into())))
}

/// GET /folder/:folderId/content - A folder and its direct children.
#[utoipa::path(
    get,
    path = "/folder/{folder_id}/content",
    tag = "folders",
    params(("folder_id" = String, Path, description = "Folder ID")),
    responses(
        (status = 200, description = "Folder content", body = FolderContentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Folder not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn folder_content(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(folder_id): Path<String>,
) -> Result<Json<ApiResponse<FolderContentResponse>>, ApiError> {
    let (folder, children) = state
        .file_service()
        .folder_content(claims.sub, &folder_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Folder not found"))?;

    Ok(Json(ApiResponse::new(FolderContentResponse::new(
        folder, children,
    ))))
}

/// GET /folder/serveIn/:fileId - Content of the folder containing a record.
#[utoipa::path(
    get,
    path = "/folder/serveIn/{file_id}",
    tag = "folders",
    params(("file_id" = String, Path, description = "Record ID")),
    responses(
        (status = 200, description = "Content of the containing folder", body = FolderContentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Record not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn serve_in(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(file_id): Path<String>,
) -> Result<Json<ApiResponse<FolderContentResponse>>, ApiError> {
    let service = state.file_service();
    let details = service
        .details(claims.sub, &file_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Record not found"))?;

    // The root folder serves its own content.
    let parent_id = details
        .record
        .parent_id
        .unwrap_or_else(|| details.record.id.clone());

    let (folder, children) = service
        .folder_content(claims.sub, &parent_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Folder not found"))?;

    Ok(Json(ApiResponse::new(FolderContentResponse::new(
        folder, children,
    ))))
}

/// POST /folder/:folderId/upload - Upload files into a folder.
///
/// Request body: multipart/form-data with one or more "files" fields.
#[utoipa::path(
    post,
    path = "/folder/{folder_id}/upload",
    tag = "folders",
    params(("folder_id" = String, Path, description = "Destination folder ID")),
    responses(
        (status = 200, description = "Stored records", body = Vec<FileRecordResponse>),
        (status = 400, description = "Invalid multipart data"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Folder not found"),
        (status = 422, description = "Invalid filename or file too large")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(folder_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Vec<FileRecordResponse>>>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        if field.name() != Some("files") {
            continue;
        }

        let name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("Missing filename"))?;
        let content = field
            .bytes()
            .await
            .map_err(|e| {
                tracing::error!("Failed to read file content: {}", e);
                ApiError::bad_request("Failed to read file")
            })?
            .to_vec();

        files.push(IncomingFile { name, content });
    }

    if files.is_empty() {
        return Err(ApiError::bad_request("No files provided"));
    }

    let stored = state
        .file_service()
        .upload_files(claims.sub, &folder_id, files)
        .await?;

    Ok(Json(ApiResponse::new(
        stored.into_iter().map(Into::into).collect(),
    )))
}
