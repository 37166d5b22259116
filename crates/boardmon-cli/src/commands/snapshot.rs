//! `boardmon snapshot` — one sample, printed instead of logged.

use std::thread;

use boardmon_core::{TelemetrySources, collect_record};

/// Run the snapshot command: take the baseline snapshot, wait one period,
/// then print the assembled record in its wire form.
pub fn run(period_secs: f64) {
    let period = super::period_from_secs(period_secs);
    let sources = TelemetrySources::default();

    let baseline = match sources.cpu_counters() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    thread::sleep(period);

    let (record, _) = collect_record(&sources, baseline);
    println!("{}", record.to_log_line());
}
