pub mod latest;
pub mod sample;
pub mod serve;
pub mod snapshot;

use std::time::Duration;

/// Parse a duration string like "5m", "30s", "1h", "100ms".
pub fn parse_duration(s: &str) -> Duration {
    let s = s.trim();

    let (numeric, multiplier) = if let Some(rest) = s.strip_suffix("ms") {
        (rest, 1u64)
    } else if let Some(rest) = s.strip_suffix('s') {
        (rest, 1000)
    } else if let Some(rest) = s.strip_suffix('m') {
        (rest, 60_000)
    } else if let Some(rest) = s.strip_suffix('h') {
        (rest, 3_600_000)
    } else {
        // Assume seconds
        (s, 1000)
    };

    let value: u64 = numeric.parse().unwrap_or_else(|_| {
        eprintln!("Invalid duration: {s}");
        std::process::exit(1);
    });

    Duration::from_millis(value * multiplier)
}

/// Turn the `--period` flag into a Duration, rejecting nonsense values.
pub fn period_from_secs(period: f64) -> Duration {
    if !period.is_finite() || period <= 0.0 {
        eprintln!("Invalid period: {period} (must be a positive number of seconds)");
        std::process::exit(1);
    }
    Duration::from_secs_f64(period)
}
