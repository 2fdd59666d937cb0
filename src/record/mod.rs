//! File/folder record management for cabinet.
//!
//! This module holds the core of the system:
//! - Flat, per-user FileRecord metadata with parent references
//! - Ownership-checked id resolution
//! - Derived folder-tree projection
//! - Blob storage with UUID naming
//! - Zip packaging of multi-file selections

mod archive;
mod model;
mod repository;
mod service;
mod storage;
mod tree;

pub use archive::{write_zip, ArchiveEntry};
pub use model::{FileRecord, NewRecord, RecordKind};
pub use repository::RecordRepository;
pub use service::{
    validate_name, ArchivePayload, DeleteReport, DownloadPayload, FileService, IncomingFile,
    RecordDetails,
};
pub use storage::FileStorage;
pub use tree::{build_tree, FolderTreeNode};

/// Maximum length for a file or folder name (in characters).
pub const MAX_NAME_LENGTH: usize = 255;

/// Name of the per-user root folder.
pub const ROOT_NAME: &str = "root";
