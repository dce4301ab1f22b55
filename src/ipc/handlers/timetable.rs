use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{optional_weekday, required_index, required_str};
use crate::ipc::types::{log_dropped, AppState, OpenView, Request};
use crate::timetable::{CellContent, ScheduleView, ViewState, Weekday};
use serde_json::{json, Value};
use uuid::Uuid;

fn view_id(req: &Request) -> Result<String, Value> {
    required_str(req, "viewId")
}

fn unknown_view(req: &Request, id: &str) -> Value {
    err(
        &req.id,
        "not_found",
        "view not found",
        Some(json!({ "viewId": id })),
    )
}

fn handle_open(state: &mut AppState, req: &Request) -> Value {
    let weekday = match optional_weekday(req) {
        Ok(w) => w.unwrap_or_else(Weekday::today),
        Err(e) => return e,
    };

    let grid = state.config.grid();
    let mut view = ScheduleView::new(weekday);
    if let Err(e) = view.activate(state.store.day(weekday), &grid) {
        return err(&req.id, "bad_config", e.to_string(), None);
    }
    let id = Uuid::new_v4().to_string();
    let subscription = state.bus.subscribe(weekday);
    tracing::info!(view = %id, %weekday, state = view.state().name(), "view opened");
    log_dropped(&id, &view);

    let result = json!({
        "viewId": id,
        "weekday": weekday,
        "state": view.state().name(),
        "needsFetch": *view.state() == ViewState::Loading,
    });
    state.views.insert(id, OpenView { view, subscription });
    ok(&req.id, result)
}

fn handle_get(state: &mut AppState, req: &Request) -> Value {
    let id = match view_id(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let halls = json!(state.config.halls);
    let Some(open) = state.views.get_mut(&id) else {
        return unknown_view(req, &id);
    };
    let notices = open.view.take_notices();
    let view = &open.view;

    let mut result = json!({
        "viewId": id,
        "weekday": view.weekday(),
        "state": view.state().name(),
        "error": view.state().error_message(),
        "halls": halls,
        "notices": notices,
    });
    if let Some(schedule) = view.schedule() {
        let rows: Vec<Value> = schedule
            .grid
            .rows()
            .into_iter()
            .map(|(time, cells)| json!({ "time": time, "cells": cells }))
            .collect();
        let dropped: Vec<Value> = schedule
            .dropped()
            .map(|(p, reason)| json!({ "lessonId": p.lesson_id, "hall": p.hall, "reason": reason }))
            .collect();
        result["rows"] = json!(rows);
        result["placements"] = json!(schedule.placements);
        result["dropped"] = json!(dropped);
    }
    ok(&req.id, result)
}

/// Prefill for the create-lesson form from an empty cell.
fn handle_slot(state: &mut AppState, req: &Request) -> Value {
    let id = match view_id(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let hall = match required_str(req, "hall") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let row = match required_index(req, "row") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(open) = state.views.get(&id) else {
        return unknown_view(req, &id);
    };
    let Some(schedule) = open.view.schedule() else {
        return err(&req.id, "not_ready", "timetable is not ready", None);
    };
    let Some(column) = schedule.grid.column(&hall) else {
        return err(&req.id, "not_found", format!("unknown hall: {}", hall), None);
    };

    // The closing row is only a boundary; a lesson starting there never fits.
    if row + 1 == column.cells.len() {
        return err(
            &req.id,
            "bad_params",
            "closing row has no slot",
            Some(json!({ "hall": hall, "row": row })),
        );
    }

    match column.cells.get(row) {
        Some(CellContent::Empty { slot }) => ok(
            &req.id,
            json!({
                "weekday": schedule.weekday,
                "hall": slot.hall,
                "timeStart": slot.start,
                "timeEnd": slot.end,
            }),
        ),
        Some(_) => err(
            &req.id,
            "bad_params",
            "slot is occupied",
            Some(json!({ "hall": hall, "row": row })),
        ),
        None => err(
            &req.id,
            "bad_params",
            format!("row must be < {}", column.cells.len()),
            None,
        ),
    }
}

fn handle_close(state: &mut AppState, req: &Request) -> Value {
    let id = match view_id(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(open) = state.views.remove(&id) else {
        return unknown_view(req, &id);
    };
    state.bus.unsubscribe(open.subscription);
    tracing::info!(view = %id, weekday = %open.view.weekday(), "view closed");
    ok(&req.id, json!({ "viewId": id, "closed": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "timetable.open" => Some(handle_open(state, req)),
        "timetable.get" => Some(handle_get(state, req)),
        "timetable.slot" => Some(handle_slot(state, req)),
        "timetable.close" => Some(handle_close(state, req)),
        _ => None,
    }
}
