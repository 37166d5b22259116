//! Telemetry record model and its newline-delimited JSON wire format.
//!
//! One record describes one sampling tick. The serialized form is a single
//! JSON object per line with a fixed key order and fixed numeric precision,
//! so the log stays greppable and byte-predictable:
//!
//! ```text
//! {"timestamp":1700000000.123456789,"uptime_sec":86400.50,"cpu":{"temp_c":48.20,"usage_pct":12.5},"memory":{"total_kb":8000000,"free_kb":2000000,"available_kb":3000000,"used_pct":62.5}}
//! ```
//!
//! Reading is looser than writing: a parsed line missing a key yields zero
//! for that field rather than an error, which lets readers survive records
//! truncated mid-append.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Every serialized record starts with this byte sequence. Lines that do not
/// are skipped by readers.
pub const RECORD_PREFIX: &str = "{\"timestamp\"";

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// Wall-clock capture time, kept as whole seconds plus nanoseconds so the
/// log line can carry all nine fractional digits. Serializes as a plain
/// fractional-seconds f64 for JSON consumers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Timestamp {
    pub secs: u64,
    pub nanos: u32,
}

impl Timestamp {
    /// Current wall-clock time. A clock before the epoch reads as zero.
    pub fn now() -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            secs: since_epoch.as_secs(),
            nanos: since_epoch.subsec_nanos(),
        }
    }

    /// Seconds since the epoch as f64. Loses sub-microsecond detail for
    /// current dates; the log line itself keeps full precision.
    pub fn as_secs_f64(self) -> f64 {
        self.secs as f64 + f64::from(self.nanos) * 1e-9
    }

    /// Rebuild from fractional seconds. Non-finite or negative input reads
    /// as the epoch.
    pub fn from_secs_f64(value: f64) -> Self {
        if !value.is_finite() || value <= 0.0 {
            return Self::default();
        }
        let secs = value.trunc() as u64;
        let nanos = ((value - value.trunc()) * 1e9).round() as u32;
        if nanos >= 1_000_000_000 {
            Self {
                secs: secs + 1,
                nanos: 0,
            }
        } else {
            Self { secs, nanos }
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.as_secs_f64())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        f64::deserialize(deserializer).map(Self::from_secs_f64)
    }
}

// ---------------------------------------------------------------------------
// Record model
// ---------------------------------------------------------------------------

/// CPU section of a record. `temp_c` is -1.0 when no thermal zone is
/// readable; `usage_pct` is -1.0 when the tick had no usable counter delta.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuTelemetry {
    pub temp_c: f64,
    pub usage_pct: f64,
}

/// Memory section of a record, in kibibytes as reported by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryTelemetry {
    pub total_kb: u64,
    pub free_kb: u64,
    pub available_kb: u64,
    pub used_pct: f64,
}

/// One telemetry sample, produced once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryRecord {
    pub timestamp: Timestamp,
    pub uptime_sec: f64,
    pub cpu: CpuTelemetry,
    pub memory: MemoryTelemetry,
}

impl TelemetryRecord {
    /// Serialize to the exact wire form: fixed key order, two decimals for
    /// uptime and temperature, one for the percentages, nine for the
    /// timestamp fraction. No trailing newline.
    pub fn to_log_line(&self) -> String {
        format!(
            "{{\"timestamp\":{}.{:09},\"uptime_sec\":{:.2},\"cpu\":{{\"temp_c\":{:.2},\"usage_pct\":{:.1}}},\"memory\":{{\"total_kb\":{},\"free_kb\":{},\"available_kb\":{},\"used_pct\":{:.1}}}}}",
            self.timestamp.secs,
            self.timestamp.nanos,
            self.uptime_sec,
            self.cpu.temp_c,
            self.cpu.usage_pct,
            self.memory.total_kb,
            self.memory.free_kb,
            self.memory.available_kb,
            self.memory.used_pct,
        )
    }
}

/// Fraction of total memory not available for new allocations, as a
/// percentage. `MemAvailable` counts reclaimable cache, so this tracks real
/// pressure better than free-based math. Zero total reads as 0.0.
pub fn memory_used_pct(total_kb: u64, available_kb: u64) -> f64 {
    if total_kb == 0 {
        return 0.0;
    }
    (1.0 - available_kb as f64 / total_kb as f64) * 100.0
}

// ---------------------------------------------------------------------------
// Lenient line parsing
// ---------------------------------------------------------------------------

/// Parse one log line into a record.
///
/// Well-formed lines go through serde. Anything else (truncated tail,
/// foreign writer, corrupt middle) falls back to a per-key scan where each
/// key found contributes its value and each key missing contributes zero.
/// This never fails: the caller already decided the line qualifies.
pub fn parse_record_line(line: &str) -> TelemetryRecord {
    if let Ok(record) = serde_json::from_str::<TelemetryRecord>(line) {
        return record;
    }

    TelemetryRecord {
        timestamp: Timestamp::from_secs_f64(scan_field(line, "timestamp")),
        uptime_sec: scan_field(line, "uptime_sec"),
        cpu: CpuTelemetry {
            temp_c: scan_field(line, "temp_c"),
            usage_pct: scan_field(line, "usage_pct"),
        },
        memory: MemoryTelemetry {
            total_kb: scan_field(line, "total_kb") as u64,
            free_kb: scan_field(line, "free_kb") as u64,
            available_kb: scan_field(line, "available_kb") as u64,
            used_pct: scan_field(line, "used_pct"),
        },
    }
}

/// Find `"key":` in the line and parse the number right after it. Missing
/// key or unparseable number reads as 0.0.
fn scan_field(line: &str, key: &str) -> f64 {
    let needle = format!("\"{key}\":");
    let Some(at) = line.find(&needle) else {
        return 0.0;
    };
    let rest = &line[at + needle.len()..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')))
        .unwrap_or(rest.len());
    rest[..end].parse().unwrap_or(0.0)
}
