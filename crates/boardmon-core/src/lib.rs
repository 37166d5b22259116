//! # boardmon-core
//!
//! **Kernel telemetry for single-board computers, one JSON line at a time.**
//!
//! `boardmon-core` is the library behind the `boardmon` sampler and
//! dashboard: it probes the kernel's virtual files (/proc/stat,
//! /proc/meminfo, /proc/uptime, the thermal zone), derives per-tick CPU and
//! memory telemetry, appends records to a newline-delimited JSON log, and
//! recovers the newest record from that log's tail.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use std::time::Duration;
//! use boardmon_core::{RecordLog, Sampler, TelemetrySources};
//!
//! let log = RecordLog::open("monitor.log").unwrap();
//! let mut sampler =
//!     Sampler::new(TelemetrySources::default(), log, Duration::from_secs(1)).unwrap();
//!
//! // One record per second until the flag clears.
//! let running = AtomicBool::new(true);
//! sampler.run(&running, Some(Duration::from_secs(30))).unwrap();
//!
//! // Any process can read the newest record back without scanning the file.
//! let latest = boardmon_core::latest_record("monitor.log".as_ref()).unwrap();
//! println!("cpu at {:.1}%", latest.cpu.usage_pct);
//! ```
//!
//! ## Architecture
//!
//! Probes → Sampler (delta + assemble) → RecordLog → tail extractor
//!
//! The log is the only coupling between writer and readers: the sampler
//! appends and flushes, readers re-read the tail window per request. Either
//! side can restart at any time without coordination.

pub mod probe;
pub mod record;
pub mod sampler;
pub mod store;
pub mod tail;

pub use probe::{CpuCounters, MemoryInfo, SourceUnavailable, TelemetrySources};
pub use record::{
    CpuTelemetry, MemoryTelemetry, RECORD_PREFIX, TelemetryRecord, Timestamp, memory_used_pct,
    parse_record_line,
};
pub use sampler::{
    DEFAULT_SAMPLE_PERIOD, Sampler, SamplerError, USAGE_UNAVAILABLE, collect_record,
};
pub use store::RecordLog;
pub use tail::{ExtractError, TAIL_WINDOW_BYTES, latest_record};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
