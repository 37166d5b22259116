//! HTTP dashboard for the boardmon record log.
//!
//! Every request re-reads the log's tail and renders whatever record is
//! newest right then. No state is cached between requests, so the server
//! can outlive, predate, or restart independently of the sampler writing
//! the log.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
};
use log::info;
use serde::Serialize;

use boardmon_core::record::TelemetryRecord;
use boardmon_core::tail::{ExtractError, latest_record};

/// Meta-refresh interval of the dashboard page, in seconds. Matches the
/// sampler's default period so the page tracks the log tick for tick.
pub const DASHBOARD_REFRESH_SECS: u32 = 1;

const NO_DATA_BODY: &str = "No data available yet.";

/// Shared server state.
struct AppState {
    log_path: PathBuf,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    log: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    latest_timestamp: Option<f64>,
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Response {
    match latest_record(&state.log_path) {
        Ok(record) => Html(render_dashboard(&record)).into_response(),
        Err(ExtractError::NoData) => NO_DATA_BODY.into_response(),
        Err(ExtractError::Io(e)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, format!("log read failed: {e}")).into_response()
        }
    }
}

async fn handle_latest(State(state): State<Arc<AppState>>) -> Response {
    match latest_record(&state.log_path) {
        Ok(record) => Json(record).into_response(),
        Err(ExtractError::NoData) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "no telemetry recorded yet" })),
        )
            .into_response(),
        Err(ExtractError::Io(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let latest = latest_record(&state.log_path).ok();
    Json(HealthResponse {
        status: if latest.is_some() { "ok" } else { "no_data" },
        log: state.log_path.display().to_string(),
        latest_timestamp: latest.map(|r| r.timestamp.as_secs_f64()),
    })
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

const DASHBOARD_STYLE: &str = "body { background-color: #121212; color: #e0e0e0; font-family: 'Segoe UI', sans-serif; display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; } .dashboard { background-color: #1e1e1e; padding: 2rem; border-radius: 10px; box-shadow: 0 4px 6px rgba(0,0,0,0.3); width: 400px; } h2 { text-align: center; margin-bottom: 1.5rem; color: #ffffff; } .metric { margin-bottom: 1.5rem; } .label { display: flex; justify-content: space-between; margin-bottom: 0.5rem; font-weight: bold; } .bar-bg { background-color: #333; height: 20px; border-radius: 10px; overflow: hidden; } .bar-fill { height: 100%; transition: width 0.3s ease; text-align: center; font-size: 12px; line-height: 20px; color: black; font-weight: bold; } .info-grid { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; text-align: center; margin-top: 1rem; } .info-box { background: #2c2c2c; padding: 10px; border-radius: 5px; } .val { font-size: 1.2rem; color: #fff; } .unit { font-size: 0.8rem; color: #888; }";

/// Seconds-since-boot as `HH:MM:SS`. Hours widen past two digits rather
/// than wrap.
fn format_uptime(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

fn usage_bar_color(pct: f64) -> &'static str {
    if pct > 80.0 { "#ff4444" } else { "#00C851" }
}

fn memory_bar_color(pct: f64) -> &'static str {
    if pct > 80.0 { "#ff4444" } else { "#33b5e5" }
}

/// Render one record as the full dashboard page. Sentinel values render
/// as-is: a -1.0% bar collapses to zero width in the browser.
fn render_dashboard(record: &TelemetryRecord) -> String {
    let cpu_pct = record.cpu.usage_pct;
    let mem_pct = record.memory.used_pct;
    let cpu_color = usage_bar_color(cpu_pct);
    let mem_color = memory_bar_color(mem_pct);
    let temp = record.cpu.temp_c;
    let uptime = format_uptime(record.uptime_sec);
    let free_mb = record.memory.free_kb / 1024;
    let total_mb = record.memory.total_kb / 1024;

    format!(
        "<!DOCTYPE html><html><head><meta charset=\"UTF-8\">\
         <meta http-equiv=\"refresh\" content=\"{DASHBOARD_REFRESH_SECS}\">\
         <title>boardmon</title>\
         <style>{DASHBOARD_STYLE}</style>\
         </head><body>\
         <div class=\"dashboard\">\
         <h2>Board Monitor</h2>\
         <div class=\"metric\">\
         <div class=\"label\"><span>CPU Usage</span><span>{cpu_pct:.1}%</span></div>\
         <div class=\"bar-bg\"><div class=\"bar-fill\" style=\"width: {cpu_pct:.1}%; background-color: {cpu_color};\"></div></div>\
         </div>\
         <div class=\"metric\">\
         <div class=\"label\"><span>Memory</span><span>{mem_pct:.1}%</span></div>\
         <div class=\"bar-bg\"><div class=\"bar-fill\" style=\"width: {mem_pct:.1}%; background-color: {mem_color};\"></div></div>\
         </div>\
         <div class=\"info-grid\">\
         <div class=\"info-box\"><div class=\"val\">{temp:.1}°C</div><div class=\"unit\">Temp</div></div>\
         <div class=\"info-box\"><div class=\"val\">{uptime}</div><div class=\"unit\">Uptime</div></div>\
         <div class=\"info-box\"><div class=\"val\">{free_mb} MB</div><div class=\"unit\">Free RAM</div></div>\
         <div class=\"info-box\"><div class=\"val\">{total_mb} MB</div><div class=\"unit\">Total RAM</div></div>\
         </div>\
         </div>\
         </body></html>"
    )
}

// ---------------------------------------------------------------------------
// Router and entry point
// ---------------------------------------------------------------------------

/// Build the axum router.
fn build_router(log_path: PathBuf) -> Router {
    let state = Arc::new(AppState { log_path });

    Router::new()
        .route("/", get(handle_index))
        .route("/api/v1/latest", get(handle_latest))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Run the dashboard server until the process exits. Fails fast when the
/// address cannot be bound.
pub async fn run_server(log_path: PathBuf, host: &str, port: u16) -> std::io::Result<()> {
    let app = build_router(log_path);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("dashboard listening on {addr}");
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardmon_core::record::{CpuTelemetry, MemoryTelemetry, Timestamp};
    use std::fs;
    use tempfile::tempdir;

    fn sample_record() -> TelemetryRecord {
        TelemetryRecord {
            timestamp: Timestamp {
                secs: 1_700_000_000,
                nanos: 0,
            },
            uptime_sec: 3661.0,
            cpu: CpuTelemetry {
                temp_c: 48.25,
                usage_pct: 66.7,
            },
            memory: MemoryTelemetry {
                total_kb: 1_048_576,
                free_kb: 409_600,
                available_kb: 524_288,
                used_pct: 50.0,
            },
        }
    }

    #[test]
    fn uptime_formats_as_clock() {
        assert_eq!(format_uptime(0.0), "00:00:00");
        assert_eq!(format_uptime(59.9), "00:00:59");
        assert_eq!(format_uptime(3661.0), "01:01:01");
        assert_eq!(format_uptime(-5.0), "00:00:00");
        // A four-day uptime widens the hour field instead of wrapping.
        assert_eq!(format_uptime(354_610.0), "98:30:10");
    }

    #[test]
    fn bar_colors_flip_above_eighty() {
        assert_eq!(usage_bar_color(80.0), "#00C851");
        assert_eq!(usage_bar_color(80.1), "#ff4444");
        assert_eq!(memory_bar_color(79.9), "#33b5e5");
        assert_eq!(memory_bar_color(95.0), "#ff4444");
    }

    #[test]
    fn dashboard_shows_record_values() {
        let html = render_dashboard(&sample_record());
        assert!(html.contains("<meta http-equiv=\"refresh\" content=\"1\">"));
        assert!(html.contains("<span>66.7%</span>"));
        assert!(html.contains("<span>50.0%</span>"));
        assert!(html.contains("48.2°C"));
        assert!(html.contains("01:01:01"));
        assert!(html.contains("400 MB"));
        assert!(html.contains("1024 MB"));
        assert!(html.contains("background-color: #00C851;"));
        assert!(html.contains("background-color: #33b5e5;"));
    }

    #[test]
    fn dashboard_renders_degraded_sentinels() {
        let mut record = sample_record();
        record.cpu.usage_pct = -1.0;
        record.cpu.temp_c = -1.0;
        let html = render_dashboard(&record);
        assert!(html.contains("<span>-1.0%</span>"));
        assert!(html.contains("-1.0°C"));
    }

    #[test]
    fn megabytes_truncate_toward_zero() {
        let mut record = sample_record();
        record.memory.free_kb = 2047;
        record.memory.total_kb = 2048;
        let html = render_dashboard(&record);
        assert!(html.contains(">1 MB</div>"));
        assert!(html.contains(">2 MB</div>"));
    }

    #[tokio::test]
    async fn index_serves_html_for_a_live_log() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("monitor.log");
        let mut line = sample_record().to_log_line();
        line.push('\n');
        fs::write(&log_path, line).unwrap();
        let state = Arc::new(AppState { log_path });

        let response = handle_index(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<span>66.7%</span>"));
    }

    #[tokio::test]
    async fn index_reports_no_data_before_first_record() {
        let dir = tempdir().unwrap();
        let state = Arc::new(AppState {
            log_path: dir.path().join("monitor.log"),
        });

        let response = handle_index(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], NO_DATA_BODY.as_bytes());
    }

    #[tokio::test]
    async fn latest_endpoint_round_trips_the_record() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("monitor.log");
        let mut line = sample_record().to_log_line();
        line.push('\n');
        fs::write(&log_path, line).unwrap();
        let state = Arc::new(AppState { log_path });

        let response = handle_latest(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!((value["cpu"]["usage_pct"].as_f64().unwrap() - 66.7).abs() < 1e-9);
        assert_eq!(value["memory"]["total_kb"].as_u64().unwrap(), 1_048_576);
    }

    #[tokio::test]
    async fn latest_endpoint_404s_without_data() {
        let dir = tempdir().unwrap();
        let state = Arc::new(AppState {
            log_path: dir.path().join("monitor.log"),
        });
        let response = handle_latest(State(state)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
