//! `boardmon latest` — print the newest record in the log.

use std::path::Path;

use boardmon_core::{ExtractError, latest_record};

/// Run the latest command.
pub fn run(log_path: &str) {
    match latest_record(Path::new(log_path)) {
        Ok(record) => match serde_json::to_string_pretty(&record) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing record: {e}");
                std::process::exit(1);
            }
        },
        // Absence of data is a state the log can be in, not a failure.
        Err(ExtractError::NoData) => println!("No data available yet."),
        Err(e) => {
            eprintln!("Error reading {log_path}: {e}");
            std::process::exit(1);
        }
    }
}
