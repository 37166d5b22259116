//! Latest-record extraction from the tail of the log.
//!
//! Readers never scan the whole file: only the final window of bytes is
//! read, so lookup cost stays flat no matter how long the sampler has been
//! running. Within that window the last line starting with the record
//! prefix wins, and a non-empty fragment after the final newline is
//! preferred over earlier complete lines because it is the newest write,
//! even if the sampler is still mid-append.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use thiserror::Error;

use crate::record::{RECORD_PREFIX, TelemetryRecord, parse_record_line};

/// Bytes read from the end of the log. Sized to hold several records, so a
/// qualifying line is found whenever the sampler has written recently. A
/// single record longer than this window is unrecoverable; the window does
/// not grow to chase one.
pub const TAIL_WINDOW_BYTES: u64 = 1024;

/// Why no record came back.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The log is missing, empty, or its tail holds no recognizable record.
    #[error("no telemetry recorded yet")]
    NoData,
    /// The log exists but could not be read.
    #[error("log read failed: {0}")]
    Io(#[from] io::Error),
}

/// Read the newest record recoverable from the log's tail window.
///
/// A missing log is [`ExtractError::NoData`], same as an empty one: before
/// the sampler's first append the two states are indistinguishable to a
/// reader. Other I/O failures are reported as [`ExtractError::Io`].
pub fn latest_record(path: &Path) -> Result<TelemetryRecord, ExtractError> {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ExtractError::NoData),
        Err(e) => return Err(e.into()),
    };
    let len = file.metadata()?.len();
    if len == 0 {
        return Err(ExtractError::NoData);
    }

    let start = len.saturating_sub(TAIL_WINDOW_BYTES);
    file.seek(SeekFrom::Start(start))?;
    let mut window = vec![0u8; (len - start) as usize];
    file.read_exact(&mut window)?;
    let window = String::from_utf8_lossy(&window);

    last_qualifying_line(&window)
        .map(parse_record_line)
        .ok_or(ExtractError::NoData)
}

/// Pick the line the extractor should parse out of the tail window.
fn last_qualifying_line(window: &str) -> Option<&str> {
    let (complete, dangling) = match window.rfind('\n') {
        Some(at) => (&window[..at], &window[at + 1..]),
        None => ("", window),
    };

    let mut best = None;
    for line in complete.split('\n') {
        if line.starts_with(RECORD_PREFIX) {
            best = Some(line);
        }
    }
    if dangling.starts_with(RECORD_PREFIX) {
        best = Some(dangling);
    }
    best
}
