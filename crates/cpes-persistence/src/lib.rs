//! ---
//! cpes_section: "05-persistence-logging"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Persistence abstractions for evaluated reading streams."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
pub mod series_log;

use std::path::{Path, PathBuf};

use cpes_core::{DerivedMetrics, SensorReading};
use parking_lot::Mutex;
use thiserror::Error;

pub use series_log::{latest_valid, replay, SeriesEntry, SeriesLogReader, SeriesLogWriter};

pub type Result<T> = std::result::Result<T, PersistenceError>;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Thread-safe handle over one series log, shared between the API handlers
/// and the ingestion path. Appends are serialized through an internal lock;
/// reads open the file independently.
pub struct SeriesStore {
    path: PathBuf,
    writer: Mutex<SeriesLogWriter>,
}

impl SeriesStore {
    pub fn open(path: &Path) -> Result<Self> {
        let writer = SeriesLogWriter::open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, reading: SensorReading, metrics: DerivedMetrics) -> Result<u64> {
        self.writer.lock().append(reading, metrics)
    }

    /// Number of entries appended over the life of the log.
    pub fn entry_count(&self) -> u64 {
        self.writer.lock().last_sequence()
    }

    pub fn latest_valid(&self) -> Result<Option<SeriesEntry>> {
        series_log::latest_valid(&self.path)
    }

    pub fn read_all(&self) -> Result<Vec<SeriesEntry>> {
        let mut entries = Vec::new();
        series_log::replay(&self.path, |entry| {
            entries.push(entry);
            Ok(())
        })?;
        Ok(entries)
    }
}
