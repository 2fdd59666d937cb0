//! Record types for cabinet.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Kind of a file record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Regular file with stored content.
    File,
    /// Folder containing other records.
    Folder,
}

impl RecordKind {
    /// Convert kind to the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::File => "file",
            RecordKind::Folder => "folder",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(RecordKind::File),
            "folder" => Ok(RecordKind::Folder),
            _ => Err(format!("unknown record kind: {s}")),
        }
    }
}

impl TryFrom<String> for RecordKind {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A file or folder metadata record.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileRecord {
    /// Opaque unique ID.
    pub id: String,
    /// Owning user ID.
    pub owner_id: i64,
    /// Parent record ID (None only for the owner's root folder).
    pub parent_id: Option<String>,
    /// Record name, unique among siblings.
    pub name: String,
    /// File or folder.
    #[sqlx(try_from = "String")]
    pub kind: RecordKind,
    /// Content size in bytes (0 for folders).
    pub size: i64,
    /// Blob storage handle (files only).
    pub stored_name: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last modification timestamp.
    pub modified_at: String,
}

impl FileRecord {
    /// Whether this record is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind == RecordKind::Folder
    }

    /// Whether this record is the owner's root folder.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Data for creating a new record.
#[derive(Debug, Clone)]
pub struct NewRecord {
    /// Pre-generated opaque ID.
    pub id: String,
    /// Owning user ID.
    pub owner_id: i64,
    /// Parent record ID (None for the root).
    pub parent_id: Option<String>,
    /// Record name.
    pub name: String,
    /// File or folder.
    pub kind: RecordKind,
    /// Content size in bytes.
    pub size: i64,
    /// Blob storage handle (files only).
    pub stored_name: Option<String>,
}

impl NewRecord {
    /// Create a new folder record under a parent.
    pub fn folder(owner_id: i64, parent_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            parent_id: Some(parent_id.into()),
            name: name.into(),
            kind: RecordKind::Folder,
            size: 0,
            stored_name: None,
        }
    }

    /// Create a new file record under a parent.
    pub fn file(
        owner_id: i64,
        parent_id: impl Into<String>,
        name: impl Into<String>,
        size: i64,
        stored_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            parent_id: Some(parent_id.into()),
            name: name.into(),
            kind: RecordKind::File,
            size,
            stored_name: Some(stored_name.into()),
        }
    }

    /// Create a root folder record for a user.
    pub fn root(owner_id: i64, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            parent_id: None,
            name: name.into(),
            kind: RecordKind::Folder,
            size: 0,
            stored_name: None,
        }
    }
}
