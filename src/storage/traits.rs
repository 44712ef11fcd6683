//! Storage traits and error types
//!
//! This module defines the record interface for the file-backed stores and
//! associated error types.

use crate::model::{Airport, Line};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A record file exists but cannot be trusted
    #[error("Corrupt record {path}: {message}")]
    Corrupt { path: String, message: String },

    #[error("Refusing to persist incomplete record {key}: missing {missing}")]
    Incomplete { key: String, missing: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A value persisted as one JSON file per key
pub trait Record: Serialize + DeserializeOwned {
    /// Natural key; becomes the file stem
    fn record_key(&self) -> String;

    /// Checked before writing; an error aborts the save
    fn check_persistable(&self) -> StorageResult<()> {
        Ok(())
    }

    /// Checked after reading; an error marks the file corrupt
    fn check_loaded(&self) -> Result<(), String> {
        Ok(())
    }
}

impl Record for Line {
    fn record_key(&self) -> String {
        self.id.to_string()
    }

    fn check_persistable(&self) -> StorageResult<()> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(StorageError::Incomplete {
                key: self.record_key(),
                missing: missing.join(", "),
            })
        }
    }

    fn check_loaded(&self) -> Result<(), String> {
        if self.last_updated_at.is_some() && !self.is_complete() {
            return Err(format!(
                "line {} has last_updated_at but is missing {}",
                self.id,
                self.missing_fields().join(", ")
            ));
        }
        Ok(())
    }
}

impl Record for Airport {
    fn record_key(&self) -> String {
        self.abbrev.clone()
    }
}
