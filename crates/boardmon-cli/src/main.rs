//! CLI for boardmon — kernel telemetry for single-board computers.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "boardmon")]
#[command(about = "boardmon — sample kernel telemetry and serve it as a dashboard")]
#[command(version = boardmon_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sampler: append one telemetry record per tick to the log
    Sample {
        /// Log file to append records to
        #[arg(long, default_value = "monitor.log")]
        log: String,

        /// Seconds between ticks
        #[arg(long, default_value = "1.0")]
        period: f64,

        /// Stop after this long (e.g. "30s", "5m", "1h"); default: until Ctrl+C
        #[arg(long)]
        duration: Option<String>,
    },

    /// Serve the dashboard and JSON API for the newest record in the log
    Serve {
        /// Log file the sampler writes to
        #[arg(long, default_value = "monitor.log")]
        log: String,

        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Bind address
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },

    /// Take a single sample (two snapshots one period apart) and print it
    Snapshot {
        /// Seconds between the two CPU snapshots
        #[arg(long, default_value = "1.0")]
        period: f64,
    },

    /// Print the newest record recoverable from the log
    Latest {
        /// Log file to read
        #[arg(long, default_value = "monitor.log")]
        log: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Sample {
            log,
            period,
            duration,
        } => commands::sample::run(&log, period, duration.as_deref()),
        Commands::Serve { log, port, host } => commands::serve::run(&log, &host, port),
        Commands::Snapshot { period } => commands::snapshot::run(period),
        Commands::Latest { log } => commands::latest::run(&log),
    }
}
