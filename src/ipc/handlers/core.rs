use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "openViews": state.views.len(),
            "subscriptions": state.bus.len(),
            "loadedWeekdays": crate::timetable::Weekday::ALL
                .iter()
                .filter(|w| state.store.day(**w).is_some())
                .map(|w| w.index())
                .collect::<Vec<_>>(),
        }),
    )
}

fn handle_halls_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "halls": state.config.halls }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "halls.list" => Some(handle_halls_list(state, req)),
        _ => None,
    }
}
