//! Storage module for persisting agent state
//!
//! This module handles all local persistence, including:
//! - Per-line JSON records (the reconciliation cache)
//! - Per-airport JSON records shared across lines
//! - Atomic file replacement
//! - CSV exports of the scraped listings

mod export;
mod json_store;
mod traits;

pub use export::export_csv;
pub use json_store::{write_atomic, JsonStore};
pub use traits::{Record, StorageError, StorageResult};

use crate::model::{Airport, Line};

/// Line records, one `<id>.json` file per line
pub type LineStore = JsonStore<Line>;

/// Airport records, one `<ABBREV>.json` file per airport
pub type AirportStore = JsonStore<Airport>;
