//! `boardmon serve` — serve the dashboard for the newest log record.

use std::path::PathBuf;

/// Run the serve command.
pub fn run(log_path: &str, host: &str, port: u16) {
    let base = format!("http://{host}:{port}");

    println!("boardmon dashboard v{}", boardmon_core::VERSION);
    println!("  {base}");
    println!("  Log: {log_path}");
    println!();
    println!("  Endpoints:");
    println!("    GET /               Dashboard (self-refreshing HTML)");
    println!("    GET /api/v1/latest  Newest record as JSON");
    println!("    GET /health         Service health");
    println!();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(boardmon_server::run_server(
        PathBuf::from(log_path),
        host,
        port,
    )) {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}
