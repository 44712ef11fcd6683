//! Directory of JSON records, one file per key
//!
//! Records are written to a sibling temp file and renamed into place, so a
//! concurrent reader sees either the old file or the new one, never a torn
//! write.

use crate::storage::traits::{Record, StorageError, StorageResult};
use std::fmt::Display;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// File-backed cache of records keyed by [`Record::record_key`]
#[derive(Debug, Clone)]
pub struct JsonStore<R> {
    dir: PathBuf,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> JsonStore<R> {
    /// Creates a store rooted at `dir` (created lazily on first save)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            _record: PhantomData,
        }
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: impl Display) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Loads the record stored under `key`
    ///
    /// # Returns
    ///
    /// * `Ok(Some(record))` - The record was found and parsed
    /// * `Ok(None)` - No file exists for this key (never fetched)
    /// * `Err(StorageError::Corrupt)` - The file exists but cannot be trusted
    pub fn load(&self, key: impl Display) -> StorageResult<Option<R>> {
        let path = self.path_for(key);

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No record at {}", path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(StorageError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let record: R = serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        record
            .check_loaded()
            .map_err(|message| StorageError::Corrupt {
                path: path.display().to_string(),
                message,
            })?;

        Ok(Some(record))
    }

    /// Persists `record`, replacing any previous version in full
    pub fn save(&self, record: &R) -> StorageResult<PathBuf> {
        record.check_persistable()?;

        let path = self.path_for(record.record_key());
        let json = serde_json::to_string_pretty(record)?;
        write_atomic(&path, json.as_bytes())?;

        tracing::debug!("Persisted record to {}", path.display());
        Ok(path)
    }
}

/// Writes `contents` to `path` via a temp file and rename
///
/// Parent directories are created as needed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> StorageResult<()> {
    let io_err = |source: std::io::Error| StorageError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    std::fs::write(&temp_path, contents).map_err(io_err)?;
    std::fs::rename(&temp_path, path).map_err(io_err)?;
    Ok(())
}
