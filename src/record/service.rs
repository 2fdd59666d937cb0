//! High-level file operations for cabinet.
//!
//! The service ties the record repository, the blob storage and the
//! archive writer together and enforces the rules the handlers rely on:
//! owner scoping, name validation, sibling uniqueness and the root
//! folder's immunity to rename and delete.

use std::collections::HashSet;

use sqlx::SqlitePool;
use tracing::warn;

use crate::{CabinetError, Result};

use super::archive::{write_zip, ArchiveEntry};
use super::model::{FileRecord, NewRecord};
use super::repository::RecordRepository;
use super::storage::FileStorage;
use super::tree::{build_tree, FolderTreeNode};
use super::MAX_NAME_LENGTH;

/// One file from an upload request.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Client-supplied filename.
    pub name: String,
    /// File content.
    pub content: Vec<u8>,
}

/// A record together with its location in the tree.
#[derive(Debug, Clone)]
pub struct RecordDetails {
    /// The record itself.
    pub record: FileRecord,
    /// Absolute path from the root, '/'-separated. `/` for the root itself.
    pub path: String,
    /// Number of direct children (folders only).
    pub element_count: Option<i64>,
}

/// Outcome of a bulk delete.
#[derive(Debug, Clone, Default)]
pub struct DeleteReport {
    /// IDs whose records were removed.
    pub deleted: Vec<String>,
    /// IDs that did not resolve or were not deletable.
    pub skipped: Vec<String>,
}

/// Everything needed to serve a single-file download.
#[derive(Debug)]
pub struct DownloadPayload {
    /// The file record.
    pub record: FileRecord,
    /// Opened blob, positioned at the start.
    pub content: std::fs::File,
}

/// A finished archive ready for streaming.
#[derive(Debug)]
pub struct ArchivePayload {
    /// Suggested download filename.
    pub filename: String,
    /// The spooled zip file, rewound.
    pub content: std::fs::File,
}

/// Service for folder tree and file content operations.
pub struct FileService<'a> {
    pool: &'a SqlitePool,
    storage: &'a FileStorage,
    max_file_size: u64,
}

impl<'a> FileService<'a> {
    /// Create a new FileService.
    pub fn new(pool: &'a SqlitePool, storage: &'a FileStorage, max_file_size: u64) -> Self {
        Self {
            pool,
            storage,
            max_file_size,
        }
    }

    fn repo(&self) -> RecordRepository<'a> {
        RecordRepository::new(self.pool)
    }

    /// Get the owner's root folder, creating it on first use.
    pub async fn ensure_root(&self, owner_id: i64) -> Result<FileRecord> {
        let repo = self.repo();
        if let Some(root) = repo.root(owner_id).await? {
            return Ok(root);
        }
        repo.create_root(owner_id).await
    }

    /// Build the owner's complete folder tree.
    pub async fn tree(&self, owner_id: i64) -> Result<FolderTreeNode> {
        let root = self.ensure_root(owner_id).await?;
        let records = self.repo().list_owned(owner_id).await?;
        Ok(build_tree(&root, &records))
    }

    /// Get a record with its path and, for folders, its child count.
    ///
    /// Returns `None` when the ID does not resolve for this owner.
    pub async fn details(&self, owner_id: i64, id: &str) -> Result<Option<RecordDetails>> {
        let repo = self.repo();
        let Some(record) = repo.resolve(owner_id, id).await? else {
            return Ok(None);
        };

        let path = self.path_of(owner_id, &record).await?;
        let element_count = if record.is_folder() {
            Some(repo.count_children(owner_id, &record.id).await?)
        } else {
            None
        };

        Ok(Some(RecordDetails {
            record,
            path,
            element_count,
        }))
    }

    /// A folder together with its direct children.
    ///
    /// Returns `None` when the ID does not resolve to one of the owner's
    /// folders.
    pub async fn folder_content(
        &self,
        owner_id: i64,
        folder_id: &str,
    ) -> Result<Option<(FileRecord, Vec<FileRecord>)>> {
        let repo = self.repo();
        let Some(folder) = repo.resolve(owner_id, folder_id).await? else {
            return Ok(None);
        };
        if !folder.is_folder() {
            return Ok(None);
        }

        let children = repo.list_children(owner_id, &folder.id).await?;
        Ok(Some((folder, children)))
    }

    /// Create a folder under an existing parent folder.
    pub async fn create_folder(
        &self,
        owner_id: i64,
        parent_id: &str,
        name: &str,
    ) -> Result<FileRecord> {
        let name = validate_name(name)?;
        let repo = self.repo();
        let parent = repo
            .resolve(owner_id, parent_id)
            .await?
            .filter(FileRecord::is_folder)
            .ok_or_else(|| CabinetError::NotFound(format!("folder: {parent_id}")))?;

        repo.create(&NewRecord::folder(owner_id, parent.id, name))
            .await
    }

    /// Rename a record.
    ///
    /// Returns `None` when the ID does not resolve. The root folder
    /// cannot be renamed. A sibling with the same name makes this fail
    /// with a conflict.
    pub async fn rename(
        &self,
        owner_id: i64,
        id: &str,
        new_name: &str,
    ) -> Result<Option<FileRecord>> {
        let new_name = validate_name(new_name)?;
        let repo = self.repo();
        let Some(record) = repo.resolve(owner_id, id).await? else {
            return Ok(None);
        };
        if record.is_root() {
            return Err(CabinetError::Validation(
                "the root folder cannot be renamed".to_string(),
            ));
        }

        repo.rename(&record.id, &new_name).await?;
        Ok(repo.get_by_id(&record.id).await?)
    }

    /// Store uploaded files in a folder.
    ///
    /// Name collisions with existing siblings are resolved by appending
    /// a numeric suffix before the extension, so an upload never fails
    /// on a duplicate name.
    pub async fn upload_files(
        &self,
        owner_id: i64,
        folder_id: &str,
        files: Vec<IncomingFile>,
    ) -> Result<Vec<FileRecord>> {
        let repo = self.repo();
        let folder = repo
            .resolve(owner_id, folder_id)
            .await?
            .filter(FileRecord::is_folder)
            .ok_or_else(|| CabinetError::NotFound(format!("folder: {folder_id}")))?;

        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            if file.content.len() as u64 > self.max_file_size {
                let max_mb = self.max_file_size / 1024 / 1024;
                return Err(CabinetError::Validation(format!(
                    "file '{}' exceeds the maximum size of {max_mb}MB",
                    file.name
                )));
            }
            let name = validate_name(&file.name)?;
            let name = self.available_name(owner_id, &folder.id, &name).await?;

            let stored_name = self.storage.save(&file.content, &name)?;
            let record = repo
                .create(&NewRecord::file(
                    owner_id,
                    &folder.id,
                    name,
                    file.content.len() as i64,
                    stored_name,
                ))
                .await?;
            stored.push(record);
        }

        Ok(stored)
    }

    /// Serve a single file for download.
    ///
    /// Returns `None` when the ID does not resolve to one of the owner's
    /// files.
    pub async fn download(&self, owner_id: i64, id: &str) -> Result<Option<DownloadPayload>> {
        let Some(record) = self.repo().resolve(owner_id, id).await? else {
            return Ok(None);
        };
        let Some(stored_name) = record.stored_name.clone() else {
            return Ok(None);
        };

        let content = self.storage.open(&stored_name)?;
        Ok(Some(DownloadPayload { record, content }))
    }

    /// Pack a selection of records into a zip archive.
    ///
    /// IDs that do not resolve are skipped. Folders are packed
    /// recursively, keeping empty folders as directory entries. Returns
    /// `None` when nothing in the selection resolves.
    pub async fn archive(&self, owner_id: i64, ids: &[String]) -> Result<Option<ArchivePayload>> {
        let repo = self.repo();
        let mut roots = Vec::new();
        for id in ids {
            if let Some(record) = repo.resolve(owner_id, id).await? {
                roots.push(record);
            }
        }
        if roots.is_empty() {
            return Ok(None);
        }

        let filename = match roots.as_slice() {
            [only] if only.is_folder() && !only.is_root() => format!("{}.zip", only.name),
            _ => "files.zip".to_string(),
        };

        let mut entries = Vec::new();
        let mut taken: HashSet<String> = HashSet::new();
        for record in &roots {
            self.collect_entries(owner_id, record, "", &mut taken, &mut entries)
                .await?;
        }

        let content = tokio::task::spawn_blocking(move || write_zip(&entries))
            .await
            .map_err(|e| CabinetError::Archive(e.to_string()))??;

        Ok(Some(ArchivePayload { filename, content }))
    }

    /// Move records from one folder into another.
    ///
    /// IDs that are not direct children of `src_id` are skipped. A move
    /// that would create a cycle or collide with a name in the
    /// destination aborts as a whole; either every movable record moves
    /// or none does.
    pub async fn move_files(
        &self,
        owner_id: i64,
        src_id: &str,
        dest_id: &str,
        ids: &[String],
    ) -> Result<Vec<FileRecord>> {
        let repo = self.repo();
        let src = repo
            .resolve(owner_id, src_id)
            .await?
            .filter(FileRecord::is_folder)
            .ok_or_else(|| CabinetError::NotFound(format!("folder: {src_id}")))?;
        let dest = repo
            .resolve(owner_id, dest_id)
            .await?
            .filter(FileRecord::is_folder)
            .ok_or_else(|| CabinetError::NotFound(format!("folder: {dest_id}")))?;

        let mut movable = Vec::new();
        for id in ids {
            let Some(record) = repo.resolve(owner_id, id).await? else {
                continue;
            };
            if record.parent_id.as_deref() != Some(src.id.as_str()) {
                continue;
            }
            movable.push(record);
        }
        if src.id == dest.id {
            return Ok(movable);
        }

        // Validate the whole batch before touching anything.
        let dest_ancestors = repo.ancestors(owner_id, &dest.id).await?;
        for record in &movable {
            if record.is_folder()
                && (record.id == dest.id || dest_ancestors.contains(&record.id))
            {
                return Err(CabinetError::Conflict(format!(
                    "cannot move '{}' into itself",
                    record.name
                )));
            }
            if let Some(existing) = repo.child_named(owner_id, &dest.id, &record.name).await? {
                if existing.id != record.id {
                    return Err(CabinetError::Conflict(format!(
                        "'{}' already exists in the destination",
                        record.name
                    )));
                }
            }
        }

        let mut tx = self.pool.begin().await?;
        for record in &movable {
            RecordRepository::reparent(&mut tx, &record.id, &dest.id).await?;
        }
        tx.commit().await?;

        let mut moved = Vec::with_capacity(movable.len());
        for record in movable {
            if let Some(updated) = repo.get_by_id(&record.id).await? {
                moved.push(updated);
            }
        }
        Ok(moved)
    }

    /// Delete a batch of records, best-effort per ID.
    ///
    /// IDs that do not resolve and the root folder are reported as
    /// skipped. Folder deletion takes the whole subtree with it,
    /// including the stored blobs.
    pub async fn delete_files(&self, owner_id: i64, ids: &[String]) -> Result<DeleteReport> {
        let repo = self.repo();
        let mut report = DeleteReport::default();

        for id in ids {
            let Some(record) = repo.resolve(owner_id, id).await? else {
                report.skipped.push(id.clone());
                continue;
            };
            if record.is_root() {
                report.skipped.push(id.clone());
                continue;
            }

            let subtree = repo.collect_subtree(owner_id, &record.id).await?;
            if !repo.delete(&record.id).await? {
                report.skipped.push(id.clone());
                continue;
            }

            for gone in &subtree {
                if let Some(stored_name) = &gone.stored_name {
                    if let Err(e) = self.storage.delete(stored_name) {
                        warn!(stored_name = %stored_name, error = %e, "failed to remove blob");
                    }
                }
            }
            report.deleted.push(record.id);
        }

        Ok(report)
    }

    async fn path_of(&self, owner_id: i64, record: &FileRecord) -> Result<String> {
        if record.is_root() {
            return Ok("/".to_string());
        }

        let repo = self.repo();
        let mut segments = vec![record.name.clone()];
        let mut current = record.parent_id.clone();
        while let Some(parent_id) = current {
            let Some(parent) = repo.resolve(owner_id, &parent_id).await? else {
                break;
            };
            if !parent.is_root() {
                segments.push(parent.name.clone());
            }
            current = parent.parent_id;
        }

        segments.reverse();
        Ok(format!("/{}", segments.join("/")))
    }

    /// Find a sibling name that is free, appending " (2)", " (3)", ...
    /// before the extension when needed.
    async fn available_name(
        &self,
        owner_id: i64,
        parent_id: &str,
        name: &str,
    ) -> Result<String> {
        let repo = self.repo();
        if repo.child_named(owner_id, parent_id, name).await?.is_none() {
            return Ok(name.to_string());
        }

        let (stem, ext) = split_extension(name);
        for n in 2u32.. {
            let candidate = match ext {
                Some(ext) => format!("{stem} ({n}).{ext}"),
                None => format!("{stem} ({n})"),
            };
            if repo
                .child_named(owner_id, parent_id, &candidate)
                .await?
                .is_none()
            {
                return Ok(candidate);
            }
        }
        unreachable!("counter exhausted")
    }

    async fn collect_entries(
        &self,
        owner_id: i64,
        record: &FileRecord,
        prefix: &str,
        taken: &mut HashSet<String>,
        entries: &mut Vec<ArchiveEntry>,
    ) -> Result<()> {
        let name = unique_archive_name(taken, &record.name);
        let archive_path = format!("{prefix}{name}");

        if record.is_folder() {
            entries.push(ArchiveEntry::directory(format!("{archive_path}/")));
            let children = self.repo().list_children(owner_id, &record.id).await?;
            let child_prefix = format!("{archive_path}/");
            let mut child_taken = HashSet::new();
            for child in &children {
                Box::pin(self.collect_entries(
                    owner_id,
                    child,
                    &child_prefix,
                    &mut child_taken,
                    entries,
                ))
                .await?;
            }
        } else if let Some(stored_name) = &record.stored_name {
            entries.push(ArchiveEntry::file(
                archive_path,
                self.storage.path_of(stored_name),
            ));
        }

        Ok(())
    }
}

/// Validate a record name and return it trimmed.
///
/// Names must be non-empty after trimming, at most [`MAX_NAME_LENGTH`]
/// characters and free of path separators and control characters.
pub fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CabinetError::Validation("name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CabinetError::Validation(format!(
            "name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    if name.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return Err(CabinetError::Validation(
            "name must not contain path separators or control characters".to_string(),
        ));
    }
    Ok(name.to_string())
}

fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}

fn unique_archive_name(taken: &mut HashSet<String>, name: &str) -> String {
    if taken.insert(name.to_lowercase()) {
        return name.to_string();
    }
    let (stem, ext) = split_extension(name);
    for n in 2u32.. {
        let candidate = match ext {
            Some(ext) => format!("{stem} ({n}).{ext}"),
            None => format!("{stem} ({n})"),
        };
        if taken.insert(candidate.to_lowercase()) {
            return candidate;
        }
    }
    unreachable!("counter exhausted")
}
