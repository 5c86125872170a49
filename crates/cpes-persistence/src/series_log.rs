//! ---
//! cpes_section: "05-persistence-logging"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Append-only JSONL log of evaluated sensor readings."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use cpes_core::{DerivedMetrics, SensorReading};
use serde::{Deserialize, Serialize};

use crate::{PersistenceError, Result};

/// Current on-disk format version, stored in the header line.
pub const SERIES_LOG_VERSION: u16 = 1;

/// Series log file header stored as the first line in the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SeriesLogHeader {
    version: u16,
    created_at: DateTime<Utc>,
}

impl SeriesLogHeader {
    fn new() -> Self {
        Self {
            version: SERIES_LOG_VERSION,
            created_at: Utc::now(),
        }
    }
}

/// One evaluated reading captured in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesEntry {
    /// Sequential identifier assigned when appending.
    pub sequence: u64,
    pub reading: SensorReading,
    pub metrics: DerivedMetrics,
}

/// Append-only writer for the series log.
pub struct SeriesLogWriter {
    path: std::path::PathBuf,
    writer: BufWriter<File>,
    next_sequence: u64,
}

impl SeriesLogWriter {
    /// Open a series log for appending, writing a header if the file is new.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let exists = path.exists();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = BufWriter::new(file);

        if !exists || is_empty(path)? {
            let header = SeriesLogHeader::new();
            let line = serde_json::to_string(&header)?;
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            return Ok(Self {
                path: path.to_path_buf(),
                writer,
                next_sequence: 0,
            });
        }

        let next_sequence = determine_next_sequence(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer,
            next_sequence,
        })
    }

    /// Append an evaluated reading and return its assigned sequence number.
    pub fn append(&mut self, reading: SensorReading, metrics: DerivedMetrics) -> Result<u64> {
        self.next_sequence += 1;
        let entry = SeriesEntry {
            sequence: self.next_sequence,
            reading,
            metrics,
        };
        let line = serde_json::to_string(&entry)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(entry.sequence)
    }

    /// Flush buffered writes to the underlying file handle.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Highest sequence number written so far.
    pub fn last_sequence(&self) -> u64 {
        self.next_sequence
    }
}

fn is_empty(path: &Path) -> Result<bool> {
    Ok(fs::metadata(path)?.len() == 0)
}

fn determine_next_sequence(path: &Path) -> Result<u64> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut last_seq = 0u64;
    for line in reader.lines().skip(1) {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if let Ok(entry) = serde_json::from_str::<SeriesEntry>(&line) {
            last_seq = entry.sequence;
        }
    }
    Ok(last_seq)
}

/// Replay the log in order, invoking the callback for each entry.
pub fn replay<F>(path: &Path, mut handler: F) -> Result<usize>
where
    F: FnMut(SeriesEntry) -> Result<()>,
{
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut count = 0usize;
    for line in reader.lines().skip(1) {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: SeriesEntry = serde_json::from_str(&line)?;
        handler(entry)?;
        count += 1;
    }
    Ok(count)
}

/// Most recent entry whose metrics passed validation, if any. The fallback
/// behind "current metrics" when the newest reading is invalid.
pub fn latest_valid(path: &Path) -> Result<Option<SeriesEntry>> {
    let mut newest = None;
    replay(path, |entry| {
        if entry.metrics.valid {
            newest = Some(entry);
        }
        Ok(())
    })?;
    Ok(newest)
}

/// Streaming iterator over the log entries.
pub struct SeriesLogReader {
    lines: std::io::Lines<BufReader<File>>,
}

impl SeriesLogReader {
    /// Open the log for sequential reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut first_line = String::new();
        reader.read_line(&mut first_line)?; // discard header
        Ok(Self {
            lines: reader.lines(),
        })
    }
}

impl Iterator for SeriesLogReader {
    type Item = Result<SeriesEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lines.next()? {
            Ok(line) if line.trim().is_empty() => self.next(),
            Ok(line) => Some(serde_json::from_str(&line).map_err(PersistenceError::from)),
            Err(err) => Some(Err(err.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use cpes_core::{validation::InvalidReason, ReadingSource};
    use tempfile::tempdir;

    fn entry_parts(delta_t: f64) -> (SensorReading, DerivedMetrics) {
        let reading = SensorReading {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap(),
            chw_supply_temp: 7.0,
            chw_return_temp: 7.0 + delta_t,
            chw_flow_rate: 50.0,
            cond_inlet_temp: None,
            cond_outlet_temp: None,
            cond_flow_rate: None,
            ambient_temp: 32.0,
            wet_bulb_temp: None,
            chiller_power_kw: 180.0,
            chw_pump_power_kw: None,
            cw_pump_power_kw: None,
            tower_fan_power_kw: None,
            tower_fan_speed_pct: None,
            source: ReadingSource::Simulation,
        };
        let mut metrics = DerivedMetrics::invalid(
            reading.timestamp,
            delta_t,
            InvalidReason::DeltaTTooLow,
        );
        if delta_t > 2.0 {
            metrics.valid = true;
            metrics.invalid_reason = None;
            metrics.cooling_load_kw = Some(4.186 * 50.0 * delta_t);
        }
        (reading, metrics)
    }

    #[test]
    fn append_and_replay_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("readings.log");
        let mut writer = SeriesLogWriter::open(&path).unwrap();

        let (r1, m1) = entry_parts(5.0);
        let (r2, m2) = entry_parts(6.0);
        assert_eq!(writer.append(r1, m1).unwrap(), 1);
        assert_eq!(writer.append(r2, m2).unwrap(), 2);

        let mut deltas = Vec::new();
        let count = replay(&path, |entry| {
            deltas.push(entry.metrics.delta_t);
            Ok(())
        })
        .unwrap();
        assert_eq!(count, 2);
        assert_eq!(deltas, vec![5.0, 6.0]);
    }

    #[test]
    fn sequences_continue_after_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("readings.log");
        {
            let mut writer = SeriesLogWriter::open(&path).unwrap();
            let (r, m) = entry_parts(5.0);
            writer.append(r, m).unwrap();
        }
        let mut writer = SeriesLogWriter::open(&path).unwrap();
        let (r, m) = entry_parts(5.5);
        assert_eq!(writer.append(r, m).unwrap(), 2);
    }

    #[test]
    fn reader_iterates_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("readings.log");
        let mut writer = SeriesLogWriter::open(&path).unwrap();
        for delta in [5.0, 5.5, 6.0] {
            let (r, m) = entry_parts(delta);
            writer.append(r, m).unwrap();
        }

        let reader = SeriesLogReader::open(&path).unwrap();
        let sequences: Vec<_> = reader.map(|entry| entry.unwrap().sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
    }

    #[test]
    fn latest_valid_skips_trailing_invalid_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("readings.log");
        let mut writer = SeriesLogWriter::open(&path).unwrap();

        let (r, m) = entry_parts(5.0);
        writer.append(r, m).unwrap();
        let (r, m) = entry_parts(1.0); // invalid
        writer.append(r, m).unwrap();

        let latest = latest_valid(&path).unwrap().unwrap();
        assert_eq!(latest.sequence, 1);
        assert!(latest.metrics.valid);
    }

    #[test]
    fn empty_log_has_no_latest_valid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("readings.log");
        let _writer = SeriesLogWriter::open(&path).unwrap();
        assert!(latest_valid(&path).unwrap().is_none());
    }
}
