//! Append-only record log.
//!
//! The log is the only channel between the sampler and its readers. Records
//! are appended one line at a time and flushed immediately, so a reader
//! polling the file never waits on a buffered tail. Nothing is ever
//! rewritten; restarted samplers keep appending to the existing file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::record::TelemetryRecord;

/// Writer handle for the record log.
#[derive(Debug)]
pub struct RecordLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl RecordLog {
    /// Open the log for appending, creating it when absent. Existing
    /// content is never touched.
    pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().append(true).create(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Append one record as a single line and flush it to the OS.
    pub fn append(&mut self, record: &TelemetryRecord) -> std::io::Result<()> {
        let mut line = record.to_log_line();
        line.push('\n');
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CpuTelemetry, TelemetryRecord, Timestamp};
    use std::fs;
    use tempfile::tempdir;

    fn record_at(secs: u64) -> TelemetryRecord {
        TelemetryRecord {
            timestamp: Timestamp { secs, nanos: 0 },
            cpu: CpuTelemetry {
                temp_c: 40.0,
                usage_pct: 10.0,
            },
            ..TelemetryRecord::default()
        }
    }

    #[test]
    fn appends_one_line_per_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("monitor.log");
        let mut log = RecordLog::open(&path).unwrap();
        log.append(&record_at(1)).unwrap();
        log.append(&record_at(2)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.ends_with("}\n"));
        for line in content.lines() {
            assert!(line.starts_with("{\"timestamp\""));
        }
    }

    #[test]
    fn reopening_preserves_earlier_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("monitor.log");
        {
            let mut log = RecordLog::open(&path).unwrap();
            log.append(&record_at(1)).unwrap();
        }
        {
            let mut log = RecordLog::open(&path).unwrap();
            log.append(&record_at(2)).unwrap();
        }
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("\"timestamp\":1.000000000"));
        assert!(content.contains("\"timestamp\":2.000000000"));
    }

    #[test]
    fn records_are_readable_before_the_log_closes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("monitor.log");
        let mut log = RecordLog::open(&path).unwrap();
        log.append(&record_at(7)).unwrap();
        // Flush-per-append means the line is on disk while the writer lives.
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"timestamp\":7.000000000"));
    }
}
