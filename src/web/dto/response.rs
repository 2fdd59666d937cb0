//! Response DTOs for the Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::datetime::to_rfc3339;
use crate::record::{DeleteReport, FileRecord, RecordDetails, RecordKind};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Login / registration response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Access token (JWT).
    pub access_token: String,
    /// Access token expiry in seconds.
    pub expires_in: u64,
    /// User information.
    pub user: UserInfo,
}

/// User information in responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Current user response (for /auth/me).
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Account creation timestamp.
    pub created_at: String,
}

/// A file or folder record.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileRecordResponse {
    /// Record ID.
    pub id: String,
    /// Parent folder ID (absent for the root folder).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Record name.
    pub name: String,
    /// File or folder.
    pub kind: RecordKind,
    /// Content size in bytes (0 for folders).
    pub size: i64,
    /// Creation timestamp.
    pub created_at: String,
    /// Last modification timestamp.
    pub modified_at: String,
}

impl From<FileRecord> for FileRecordResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            parent_id: record.parent_id,
            name: record.name,
            kind: record.kind,
            size: record.size,
            created_at: to_rfc3339(&record.created_at),
            modified_at: to_rfc3339(&record.modified_at),
        }
    }
}

/// Record details including its place in the tree.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileDetailsResponse {
    /// The record.
    #[serde(flatten)]
    pub record: FileRecordResponse,
    /// Absolute path from the root.
    pub path: String,
    /// Number of direct children (folders only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_count: Option<i64>,
}

impl From<RecordDetails> for FileDetailsResponse {
    fn from(details: RecordDetails) -> Self {
        Self {
            record: details.record.into(),
            path: details.path,
            element_count: details.element_count,
        }
    }
}

/// A folder and its direct children.
#[derive(Debug, Serialize, ToSchema)]
pub struct FolderContentResponse {
    /// Folder ID.
    pub id: String,
    /// Folder name.
    pub name: String,
    /// Parent folder ID (absent for the root folder).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Direct children, folders first by the deterministic sibling order.
    pub entries: Vec<FileRecordResponse>,
}

impl FolderContentResponse {
    /// Build from a folder record and its listed children.
    pub fn new(folder: FileRecord, children: Vec<FileRecord>) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
            parent_id: folder.parent_id,
            entries: children.into_iter().map(Into::into).collect(),
        }
    }
}

/// Per-ID outcome of a bulk delete.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteReportResponse {
    /// IDs whose records were removed.
    pub deleted: Vec<String>,
    /// IDs that did not resolve or were not deletable.
    pub skipped: Vec<String>,
}

impl From<DeleteReport> for DeleteReportResponse {
    fn from(report: DeleteReport) -> Self {
        Self {
            deleted: report.deleted,
            skipped: report.skipped,
        }
    }
}
