//! Request DTOs for the Web API.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::validation::no_control_chars;

/// Login request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// User registration request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Username.
    #[validate(
        length(min = 3, max = 32, message = "Username must be 3-32 characters"),
        custom(function = "no_control_chars")
    )]
    pub username: String,
    /// Password.
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
    /// Email (optional).
    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
}

/// Move request: move records out of one folder into another.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveFilesRequest {
    /// Folder the records currently live in.
    #[validate(length(min = 1, message = "srcId is required"))]
    pub src_id: String,
    /// Destination folder.
    #[validate(length(min = 1, message = "destId is required"))]
    pub dest_id: String,
    /// Records to move.
    #[validate(length(min = 1, message = "fileIds must not be empty"))]
    pub file_ids: Vec<String>,
}

/// Bulk delete request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFilesRequest {
    /// Records to delete.
    #[validate(length(min = 1, message = "fileIds must not be empty"))]
    pub file_ids: Vec<String>,
}

/// Query parameters for the multi-record download endpoint.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadQuery {
    /// Comma-separated record IDs.
    pub file_ids: String,
}

impl DownloadQuery {
    /// Split the comma-separated ID list, dropping empty segments.
    pub fn ids(&self) -> Vec<String> {
        self.file_ids
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}
