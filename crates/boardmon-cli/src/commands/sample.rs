//! `boardmon sample` — run the telemetry sampler against the live kernel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use boardmon_core::{RecordLog, Sampler, TelemetrySources};

/// Run the sample command.
pub fn run(log_path: &str, period_secs: f64, duration: Option<&str>) {
    let period = super::period_from_secs(period_secs);
    let max_duration = duration.map(super::parse_duration);

    let log = match RecordLog::open(log_path) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Error opening log {log_path}: {e}");
            std::process::exit(1);
        }
    };

    // The baseline CPU snapshot happens here; a board whose /proc/stat is
    // unreadable cannot be sampled at all.
    let mut sampler = match Sampler::new(TelemetrySources::default(), log, period) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    println!("Sampling kernel telemetry");
    println!("  Log:      {log_path}");
    println!("  Period:   {:.1}s", period.as_secs_f64());
    if let Some(d) = max_duration {
        println!("  Duration: {:.0}s", d.as_secs_f64());
    } else {
        println!("  Duration: until Ctrl+C");
    }
    println!();

    match sampler.run(&running, max_duration) {
        Ok(ticks) => {
            println!("Recorded {ticks} records to {log_path}.");
        }
        Err(e) => {
            eprintln!("Sampling stopped: {e}");
            std::process::exit(1);
        }
    }
}
