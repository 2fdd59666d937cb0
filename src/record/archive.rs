//! Zip packaging for download requests spanning several records.
//!
//! The archive is spooled to an anonymous temp file so arbitrarily large
//! selections never have to fit in memory. Callers get the finished file
//! rewound to the start, ready for streaming.

use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use std::path::PathBuf;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::{CabinetError, Result};

/// One entry to pack into an archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Path inside the archive, '/'-separated, relative to the archive root.
    pub archive_path: String,
    /// Blob to read content from. `None` marks a directory entry.
    pub source: Option<PathBuf>,
}

impl ArchiveEntry {
    /// Directory entry, emitted so empty folders survive the round trip.
    pub fn directory(archive_path: impl Into<String>) -> Self {
        Self {
            archive_path: archive_path.into(),
            source: None,
        }
    }

    /// File entry backed by a blob on disk.
    pub fn file(archive_path: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            archive_path: archive_path.into(),
            source: Some(source.into()),
        }
    }
}

/// Write `entries` into a zip archive spooled to a temp file.
///
/// The returned file is seeked back to the beginning. Blocking I/O; run
/// inside `spawn_blocking` from async contexts.
pub fn write_zip(entries: &[ArchiveEntry]) -> Result<File> {
    let spool = tempfile::tempfile()?;
    let mut zip = ZipWriter::new(spool);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        match &entry.source {
            None => {
                zip.add_directory(&entry.archive_path, options)
                    .map_err(|e| CabinetError::Archive(e.to_string()))?;
            }
            Some(source) => {
                zip.start_file(&entry.archive_path, options)
                    .map_err(|e| CabinetError::Archive(e.to_string()))?;
                let mut blob = File::open(source)?;
                io::copy(&mut blob, &mut zip)?;
            }
        }
    }

    let mut file = zip
        .finish()
        .map_err(|e| CabinetError::Archive(e.to_string()))?;
    file.seek(SeekFrom::Start(0))?;

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn blob(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_empty_archive() {
        let file = write_zip(&[]).unwrap();
        let archive = ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn test_files_round_trip() {
        let dir = TempDir::new().unwrap();
        let entries = vec![
            ArchiveEntry::file("a.txt", blob(&dir, "a", b"alpha")),
            ArchiveEntry::file("nested/b.txt", blob(&dir, "b", b"beta")),
        ];

        let file = write_zip(&entries).unwrap();
        let mut archive = ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 2);

        let mut content = String::new();
        archive
            .by_name("a.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "alpha");

        content.clear();
        archive
            .by_name("nested/b.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "beta");
    }

    #[test]
    fn test_empty_folder_survives() {
        let entries = vec![ArchiveEntry::directory("keep/")];

        let file = write_zip(&entries).unwrap();
        let mut archive = ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 1);
        assert!(archive.by_index(0).unwrap().is_dir());
    }

    #[test]
    fn test_missing_blob_is_io_error() {
        let entries = vec![ArchiveEntry::file("x.txt", "/no/such/blob")];
        assert!(matches!(write_zip(&entries), Err(CabinetError::Io(_))));
    }
}
