mod bus;
mod config;
mod ipc;
mod logging;
mod store;
mod timetable;

use serde_json::json;
use std::io::{self, BufRead, Write};

fn main() -> anyhow::Result<()> {
    logging::init_subscriber("info");

    let config = config::TimetableConfig::from_env()?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        open = %config.open_time,
        close = %config.close_time,
        interval = config.interval_minutes,
        halls = config.halls.len(),
        "studiod starting"
    );
    let mut state = ipc::AppState::new(config);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                tracing::warn!(error = %e, "unparseable request line");
                let _ = writeln!(
                    stdout,
                    "{}",
                    json!({ "ok": false, "error": { "code": "bad_json", "message": e.to_string() } })
                );
                let _ = stdout.flush();
                continue;
            }
        };

        tracing::debug!(id = %req.id, method = %req.method, "request");
        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
