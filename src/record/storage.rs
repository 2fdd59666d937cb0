//! Blob storage for file contents.
//!
//! Record metadata lives in the database; the bytes live here under
//! opaque UUID-based names, sharded into subdirectories by the first
//! two characters of the name.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{CabinetError, Result};

/// Physical storage for uploaded file content.
///
/// Layout on disk:
/// ```text
/// {base_path}/
/// ├── 3f/
/// │   └── 3f2a9c10-....-....-....-............txt
/// └── a1/
///     └── a1b2c3d4-....-....-....-............pdf
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Open storage rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    /// Base directory of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Write `content` under a fresh UUID-based name and return that name.
    ///
    /// The extension of `original_name` is kept so stored blobs remain
    /// recognizable on disk.
    pub fn save(&self, content: &[u8], original_name: &str) -> Result<String> {
        let stored_name = Self::generate_stored_name(original_name);
        let path = self.path_of(&stored_name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;

        Ok(stored_name)
    }

    /// Open a stored blob for reading.
    ///
    /// Returns a plain [`std::fs::File`] so callers can stream it without
    /// buffering the whole content.
    pub fn open(&self, stored_name: &str) -> Result<fs::File> {
        match fs::File::open(self.path_of(stored_name)) {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(CabinetError::NotFound(format!("blob: {stored_name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read a stored blob fully into memory.
    pub fn load(&self, stored_name: &str) -> Result<Vec<u8>> {
        match fs::read(self.path_of(stored_name)) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(CabinetError::NotFound(format!("blob: {stored_name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a stored blob.
    ///
    /// Returns `false` when the blob was already gone.
    pub fn delete(&self, stored_name: &str) -> Result<bool> {
        match fs::remove_file(self.path_of(stored_name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a blob exists.
    pub fn exists(&self, stored_name: &str) -> bool {
        self.path_of(stored_name).exists()
    }

    /// Size of a stored blob in bytes.
    pub fn size(&self, stored_name: &str) -> Result<u64> {
        match fs::metadata(self.path_of(stored_name)) {
            Ok(m) => Ok(m.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(CabinetError::NotFound(format!("blob: {stored_name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Full on-disk path for a stored name: `{base}/{shard}/{stored_name}`.
    pub fn path_of(&self, stored_name: &str) -> PathBuf {
        self.base_path.join(Self::shard(stored_name)).join(stored_name)
    }

    fn shard(stored_name: &str) -> &str {
        if stored_name.len() >= 2 {
            &stored_name[..2]
        } else {
            stored_name
        }
    }

    fn extension_of(filename: &str) -> &str {
        Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("bin")
    }

    /// Generate a fresh UUID-based stored name keeping the extension of
    /// `original_name` (falls back to `bin`).
    pub fn generate_stored_name(original_name: &str) -> String {
        let uuid = Uuid::new_v4();
        let ext = Self::extension_of(original_name);
        format!("{uuid}.{ext}")
    }
}
