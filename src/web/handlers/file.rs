//! File handlers for the Web API.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use utoipa;

use crate::web::dto::{
    ApiResponse, DeleteFilesRequest, DeleteReportResponse, DownloadQuery, FileDetailsResponse,
    FileRecordResponse, MoveFilesRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// Generate a safe Content-Disposition header value for downloads.
///
/// Sanitizes the filename to prevent header injection and uses the RFC
/// 5987 filename* parameter for non-ASCII names.
pub(super) fn content_disposition_header(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let encoded = urlencoding::encode(filename);
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// Build a streaming attachment response from an already-open file.
fn attachment_response(
    filename: &str,
    content: std::fs::File,
    content_type: &str,
) -> Result<Response, ApiError> {
    let length = content
        .metadata()
        .map_err(|e| {
            tracing::error!("Failed to stat content: {}", e);
            ApiError::internal("Failed to serve content")
        })?
        .len();

    let stream = ReaderStream::new(tokio::fs::File::from_std(content));
    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, content_disposition_header(filename))
        .header(header::CONTENT_LENGTH, length)
        .body(Body::from_stream(stream))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// GET /file/details/:fileId - Record details with path and child count.
#[utoipa::path(
    get,
    path = "/file/details/{file_id}",
    tag = "files",
    params(("file_id" = String, Path, description = "Record ID")),
    responses(
        (status = 200, description = "Record details", body = FileDetailsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Record not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn file_details(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(file_id): Path<String>,
) -> Result<Json<ApiResponse<FileDetailsResponse>>, ApiError> {
    let details = state
        .file_service()
        .details(claims.sub, &file_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Record not found"))?;

    Ok(Json(ApiResponse::new(details.into())))
}

/// POST /file/:fileId/rename/:newName - Rename a record.
///
/// Responds 204 when the ID does not resolve for this user.
#[utoipa::path(
    post,
    path = "/file/{file_id}/rename/{new_name}",
    tag = "files",
    params(
        ("file_id" = String, Path, description = "Record ID"),
        ("new_name" = String, Path, description = "New name")
    ),
    responses(
        (status = 200, description = "Renamed record", body = FileRecordResponse),
        (status = 204, description = "Nothing to rename"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Name already taken among siblings"),
        (status = 422, description = "Invalid name")
    ),
    security(("bearer_auth" = []))
)]
pub async fn rename_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path((file_id, new_name)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    match state
        .file_service()
        .rename(claims.sub, &file_id, &new_name)
        .await?
    {
        Some(record) => {
            let body: FileRecordResponse = record.into();
            Ok(Json(ApiResponse::new(body)).into_response())
        }
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// GET /file/download/:fileId - Stream a single file.
///
/// Responds 204 when the ID does not resolve to one of the user's files.
#[utoipa::path(
    get,
    path = "/file/download/{file_id}",
    tag = "files",
    params(("file_id" = String, Path, description = "Record ID")),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 204, description = "Nothing to download"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(file_id): Path<String>,
) -> Result<Response, ApiError> {
    let Some(payload) = state.file_service().download(claims.sub, &file_id).await? else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let content_type = mime_guess::from_path(&payload.record.name)
        .first_or_octet_stream()
        .to_string();

    attachment_response(&payload.record.name, payload.content, &content_type)
}

/// GET /files/download?fileIds=a,b - Stream a zip of the selection.
///
/// Folders are packed recursively. Responds 204 when nothing in the
/// selection resolves.
#[utoipa::path(
    get,
    path = "/files/download",
    tag = "files",
    params(("fileIds" = String, Query, description = "Comma-separated record IDs")),
    responses(
        (status = 200, description = "Zip archive", content_type = "application/zip"),
        (status = 204, description = "Nothing to download"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_files(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let ids = query.ids();
    if ids.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let Some(payload) = state.file_service().archive(claims.sub, &ids).await? else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    attachment_response(&payload.filename, payload.content, "application/zip")
}

/// POST /files/move - Move records between folders.
#[utoipa::path(
    post,
    path = "/files/move",
    tag = "files",
    request_body = MoveFilesRequest,
    responses(
        (status = 200, description = "Moved records", body = Vec<FileRecordResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Source or destination folder not found"),
        (status = 409, description = "Move would create a cycle or a name collision")
    ),
    security(("bearer_auth" = []))
)]
pub async fn move_files(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ValidatedJson(req): ValidatedJson<MoveFilesRequest>,
) -> Result<Json<ApiResponse<Vec<FileRecordResponse>>>, ApiError> {
    let moved = state
        .file_service()
        .move_files(claims.sub, &req.src_id, &req.dest_id, &req.file_ids)
        .await?;

    Ok(Json(ApiResponse::new(
        moved.into_iter().map(Into::into).collect(),
    )))
}

/// DELETE /files/delete - Delete records, best-effort per ID.
#[utoipa::path(
    delete,
    path = "/files/delete",
    tag = "files",
    request_body = DeleteFilesRequest,
    responses(
        (status = 200, description = "Per-ID delete report", body = DeleteReportResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_files(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ValidatedJson(req): ValidatedJson<DeleteFilesRequest>,
) -> Result<Json<ApiResponse<DeleteReportResponse>>, ApiError> {
    let report = state
        .file_service()
        .delete_files(claims.sub, &req.file_ids)
        .await?;

    Ok(Json(ApiResponse::new(report.into())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_header_simple_ascii() {
        let result = content_disposition_header("document.txt");
        assert_eq!(result, "attachment; filename=\"document.txt\"");
    }

    #[test]
    fn test_content_disposition_header_non_ascii() {
        let result = content_disposition_header("résumé.txt");
        assert!(result.starts_with("attachment; filename=\""));
        assert!(result.contains("filename*=UTF-8''"));
        assert!(result.contains("%C3%A9"));
    }

    #[test]
    fn test_content_disposition_header_quote_and_backslash() {
        let result = content_disposition_header("bad\"name\\.txt");
        assert!(result.contains("filename=\"bad_name_.txt\""));
        assert!(result.contains("filename*=UTF-8''"));
    }

    #[test]
    fn test_content_disposition_header_injection() {
        let result = content_disposition_header("evil\r\nX-Injected: yes.txt");
        assert!(!result.contains('\r'));
        assert!(!result.contains('\n'));
        assert!(result.starts_with("attachment; filename="));
    }
}
