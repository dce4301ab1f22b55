use crate::ipc::error::{err, ok};
use crate::ipc::helpers::required_object;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_setup_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "timetable": state.config }))
}

fn handle_setup_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let patch = match required_object(req, "patch") {
        Ok(p) => p,
        Err(e) => return e,
    };
    let next = match state.config.patched(patch) {
        Ok(c) => c,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };

    tracing::info!(
        open = %next.open_time,
        close = %next.close_time,
        interval = next.interval_minutes,
        halls = next.halls.len(),
        "timetable settings updated"
    );
    state.config = next;
    state.refresh_views();
    ok(&req.id, json!({ "timetable": state.config }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "setup.timetable.get" => Some(handle_setup_get(state, req)),
        "setup.timetable.update" => Some(handle_setup_update(state, req)),
        _ => None,
    }
}
