//! Fixed-period sampling loop.
//!
//! The sampler holds the previous CPU counter snapshot between ticks; each
//! tick takes a fresh snapshot, derives the usage percentage from the delta,
//! probes the remaining sources, and appends one record to the log. A tick
//! whose CPU snapshot fails writes the usage sentinel and keeps the old
//! snapshot, so the next successful tick deltas across the gap instead of
//! against nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use thiserror::Error;

use crate::probe::{CpuCounters, SourceUnavailable, TelemetrySources};
use crate::record::{CpuTelemetry, MemoryTelemetry, TelemetryRecord, Timestamp, memory_used_pct};
use crate::store::RecordLog;

/// Default spacing between ticks.
pub const DEFAULT_SAMPLE_PERIOD: Duration = Duration::from_secs(1);

/// Written for `usage_pct` when a tick has no usable counter delta.
pub const USAGE_UNAVAILABLE: f64 = -1.0;

/// Conditions that stop the sampler.
#[derive(Debug, Error)]
pub enum SamplerError {
    /// The first CPU snapshot failed. Without it there is no baseline to
    /// delta against, so the sampler never starts.
    #[error(transparent)]
    Source(#[from] SourceUnavailable),
    /// An append failed. The output channel is gone; continuing to sample
    /// would silently drop records.
    #[error("log append failed: {0}")]
    Write(#[from] std::io::Error),
}

/// Probe every source once and build the record for one tick.
///
/// Returns the record together with the counter snapshot to retain: the
/// fresh one after a successful CPU probe, the caller's `prev` otherwise.
pub fn collect_record(
    sources: &TelemetrySources,
    prev: CpuCounters,
) -> (TelemetryRecord, CpuCounters) {
    let (usage_pct, retained) = match sources.cpu_counters() {
        Ok(curr) => (curr.usage_since(&prev), curr),
        Err(e) => {
            warn!("cpu snapshot failed, writing sentinel: {e}");
            (USAGE_UNAVAILABLE, prev)
        }
    };

    let memory = sources.memory_info();
    let record = TelemetryRecord {
        timestamp: Timestamp::now(),
        uptime_sec: sources.uptime_sec(),
        cpu: CpuTelemetry {
            temp_c: sources.temperature_c(),
            usage_pct,
        },
        memory: MemoryTelemetry {
            total_kb: memory.total_kb,
            free_kb: memory.free_kb,
            available_kb: memory.available_kb,
            used_pct: memory_used_pct(memory.total_kb, memory.available_kb),
        },
    };
    (record, retained)
}

/// Periodic sampler bound to one source set and one log.
#[derive(Debug)]
pub struct Sampler {
    sources: TelemetrySources,
    log: RecordLog,
    period: Duration,
    prev_cpu: CpuCounters,
}

impl Sampler {
    /// Take the baseline CPU snapshot and bind the sampler to its log.
    /// Fails when the baseline snapshot cannot be taken.
    pub fn new(
        sources: TelemetrySources,
        log: RecordLog,
        period: Duration,
    ) -> Result<Self, SamplerError> {
        let prev_cpu = sources.cpu_counters()?;
        Ok(Self {
            sources,
            log,
            period,
            prev_cpu,
        })
    }

    /// Build the record for this tick and advance the retained snapshot.
    pub fn sample(&mut self) -> TelemetryRecord {
        let (record, retained) = collect_record(&self.sources, self.prev_cpu);
        self.prev_cpu = retained;
        record
    }

    /// One full tick: sample, append, flush.
    pub fn tick(&mut self) -> Result<TelemetryRecord, SamplerError> {
        let record = self.sample();
        self.log.append(&record)?;
        debug!(
            "recorded tick: usage={:.1}% temp={:.2}C mem={:.1}%",
            record.cpu.usage_pct, record.cpu.temp_c, record.memory.used_pct
        );
        Ok(record)
    }

    /// Tick until `running` goes false or `max_duration` elapses. The
    /// period elapses before each tick so the first record already has a
    /// full delta interval behind it. Returns the number of records
    /// written.
    pub fn run(
        &mut self,
        running: &AtomicBool,
        max_duration: Option<Duration>,
    ) -> Result<u64, SamplerError> {
        info!(
            "sampling every {:.1}s into {}",
            self.period.as_secs_f64(),
            self.log.path().display()
        );
        let started = Instant::now();
        let mut ticks = 0u64;

        while running.load(Ordering::SeqCst) {
            if let Some(max) = max_duration
                && started.elapsed() >= max
            {
                break;
            }
            sleep_interruptibly(self.period, running);
            if !running.load(Ordering::SeqCst) {
                break;
            }
            self.tick()?;
            ticks += 1;
        }
        info!("sampler stopped after {ticks} records");
        Ok(ticks)
    }
}

/// Sleep for `period` in short slices so a shutdown flag flips through
/// promptly.
fn sleep_interruptibly(period: Duration, running: &AtomicBool) {
    let deadline = Instant::now() + period;
    while Instant::now() < deadline && running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(10).min(period));
    }
}
