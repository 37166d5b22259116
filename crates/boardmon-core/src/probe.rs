//! Kernel telemetry sources: /proc and sysfs readers.
//!
//! All probes are point-in-time text reads with no retained file handles,
//! so a source that appears or disappears between ticks is picked up
//! naturally. Only the CPU counter probe reports failure as an error; the
//! rest degrade to sentinels or zeros.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

/// Aggregate CPU counter line.
pub const PROC_STAT_PATH: &str = "/proc/stat";
/// Whole-field memory accounting.
pub const PROC_MEMINFO_PATH: &str = "/proc/meminfo";
/// Seconds since boot, first float on the line.
pub const PROC_UPTIME_PATH: &str = "/proc/uptime";
/// SoC temperature in millidegrees Celsius.
pub const THERMAL_ZONE_PATH: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Written for `temp_c` when the thermal zone cannot be read.
pub const TEMP_UNAVAILABLE: f64 = -1.0;

/// A mandatory source could not be read or made no sense.
#[derive(Debug, Error)]
#[error("telemetry source unavailable: {}: {reason}", .path.display())]
pub struct SourceUnavailable {
    pub path: PathBuf,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// CPU counters
// ---------------------------------------------------------------------------

/// Snapshot of the aggregate `cpu ` line in /proc/stat, in kernel ticks
/// since boot. Two snapshots a tick apart yield a usage percentage via
/// [`CpuCounters::usage_since`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuCounters {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuCounters {
    /// CPU usage between `prev` and `self` as a percentage.
    ///
    /// Idle time is `idle + iowait`; everything else counts as busy. An
    /// interval with no elapsed ticks reads as 0.0. Counter resets can push
    /// the result outside [0, 100]; the value is reported as computed so
    /// the anomaly stays visible in the log.
    pub fn usage_since(&self, prev: &CpuCounters) -> f64 {
        let prev_idle = prev.idle + prev.iowait;
        let curr_idle = self.idle + self.iowait;
        let prev_busy = prev.user + prev.nice + prev.system + prev.irq + prev.softirq + prev.steal;
        let curr_busy = self.user + self.nice + self.system + self.irq + self.softirq + self.steal;

        let total_diff = (curr_idle + curr_busy).wrapping_sub(prev_idle + prev_busy);
        let idle_diff = curr_idle.wrapping_sub(prev_idle);
        if total_diff == 0 {
            return 0.0;
        }
        total_diff.wrapping_sub(idle_diff) as f64 / total_diff as f64 * 100.0
    }
}

/// Parse the aggregate `cpu ` line out of /proc/stat content, which looks
/// like:
///
/// ```text
/// cpu  3357 0 4313 1362393 2154 0 30 0 0 0
/// cpu0 1543 0 2109 681196 ...
/// ```
///
/// Only the first four counters are mandatory; absent trailing counters
/// (old kernels stop after `softirq` or earlier) read as zero. Parsing
/// stops at the first non-numeric token, so a garbled middle field fails
/// the line rather than misassigning later columns.
fn parse_cpu_counters(content: &str) -> Result<CpuCounters, &'static str> {
    let Some(rest) = content.lines().find_map(|l| l.strip_prefix("cpu ")) else {
        return Err("no aggregate cpu line");
    };
    let fields: Vec<u64> = rest
        .split_whitespace()
        .map_while(|t| t.parse().ok())
        .collect();
    if fields.len() < 4 {
        return Err("fewer than 4 cpu counters");
    }
    Ok(CpuCounters {
        user: fields[0],
        nice: fields[1],
        system: fields[2],
        idle: fields[3],
        iowait: fields.get(4).copied().unwrap_or(0),
        irq: fields.get(5).copied().unwrap_or(0),
        softirq: fields.get(6).copied().unwrap_or(0),
        steal: fields.get(7).copied().unwrap_or(0),
    })
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// The three /proc/meminfo fields a record carries, in kB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryInfo {
    pub total_kb: u64,
    pub free_kb: u64,
    pub available_kb: u64,
}

/// Scan /proc/meminfo content for the fields we keep. Lines look like
/// `MemTotal:        8000000 kB`; order is not assumed and unknown keys
/// are skipped. A key that never appears stays zero.
pub fn parse_meminfo(content: &str) -> MemoryInfo {
    let mut info = MemoryInfo::default();
    for line in content.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let Some(value) = rest
            .split_whitespace()
            .next()
            .and_then(|v| v.parse::<u64>().ok())
        else {
            continue;
        };
        match key {
            "MemTotal" => info.total_kb = value,
            "MemFree" => info.free_kb = value,
            "MemAvailable" => info.available_kb = value,
            _ => {}
        }
    }
    info
}

// ---------------------------------------------------------------------------
// Source set
// ---------------------------------------------------------------------------

/// The file paths one sampler instance reads. Defaults point at the live
/// kernel; tests point them into a fixture directory.
#[derive(Debug, Clone)]
pub struct TelemetrySources {
    pub stat: PathBuf,
    pub thermal: PathBuf,
    pub uptime: PathBuf,
    pub meminfo: PathBuf,
}

impl Default for TelemetrySources {
    fn default() -> Self {
        Self {
            stat: PathBuf::from(PROC_STAT_PATH),
            thermal: PathBuf::from(THERMAL_ZONE_PATH),
            uptime: PathBuf::from(PROC_UPTIME_PATH),
            meminfo: PathBuf::from(PROC_MEMINFO_PATH),
        }
    }
}

impl TelemetrySources {
    /// All four paths rooted under `dir`, for fixture setups.
    pub fn under_dir(dir: &Path) -> Self {
        Self {
            stat: dir.join("stat"),
            thermal: dir.join("temp"),
            uptime: dir.join("uptime"),
            meminfo: dir.join("meminfo"),
        }
    }

    /// One snapshot of the aggregate CPU counters.
    pub fn cpu_counters(&self) -> Result<CpuCounters, SourceUnavailable> {
        let content = fs::read_to_string(&self.stat).map_err(|e| SourceUnavailable {
            path: self.stat.clone(),
            reason: e.to_string(),
        })?;
        parse_cpu_counters(&content).map_err(|reason| SourceUnavailable {
            path: self.stat.clone(),
            reason: reason.to_string(),
        })
    }

    /// SoC temperature in degrees Celsius, or [`TEMP_UNAVAILABLE`] when the
    /// zone is missing or unreadable.
    pub fn temperature_c(&self) -> f64 {
        match read_first_token(&self.thermal).and_then(|t| t.parse::<i64>().ok()) {
            Some(millideg) => millideg as f64 / 1000.0,
            None => {
                debug!("thermal zone {} unreadable", self.thermal.display());
                TEMP_UNAVAILABLE
            }
        }
    }

    /// Seconds since boot, or 0.0 when /proc/uptime is unreadable.
    pub fn uptime_sec(&self) -> f64 {
        match read_first_token(&self.uptime).and_then(|t| t.parse().ok()) {
            Some(secs) => secs,
            None => {
                debug!("uptime source {} unreadable", self.uptime.display());
                0.0
            }
        }
    }

    /// Memory accounting for this tick; unreadable source reads as all
    /// zeros.
    pub fn memory_info(&self) -> MemoryInfo {
        match fs::read_to_string(&self.meminfo) {
            Ok(content) => parse_meminfo(&content),
            Err(e) => {
                debug!("meminfo source {} unreadable: {e}", self.meminfo.display());
                MemoryInfo::default()
            }
        }
    }
}

fn read_first_token(path: &Path) -> Option<String> {
    let raw = fs::read_to_string(path).ok()?;
    raw.split_whitespace().next().map(str::to_string)
}
