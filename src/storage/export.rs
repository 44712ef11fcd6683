//! Flat CSV dumps of scraped listings
//!
//! A reporting side-channel only; nothing reads these files back.

use crate::storage::json_store::write_atomic;
use crate::storage::traits::{StorageError, StorageResult};
use serde::Serialize;
use std::path::Path;

/// Writes `records` as CSV, header row taken from the record fields
///
/// Returns the number of data rows written. An empty slice produces an
/// empty file.
pub fn export_csv<T: Serialize>(records: &[T], path: &Path) -> StorageResult<usize> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }

    let buffer = writer.into_inner().map_err(|e| StorageError::Io {
        path: path.display().to_string(),
        source: e.into_error(),
    })?;

    write_atomic(path, &buffer)?;
    tracing::debug!("Exported {} rows to {}", records.len(), path.display());
    Ok(records.len())
}
