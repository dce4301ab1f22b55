use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{required_object, required_str, required_weekday};
use crate::ipc::types::{AppState, Request};
use crate::timetable::lesson::canonical_field;
use crate::timetable::{lesson_from_draft, FieldErrors, Lesson, StoreEvent, Weekday};
use serde_json::{json, Map, Value};
use uuid::Uuid;

const DEFAULT_FETCH_FAILURE: &str = "failed to load lessons";

fn draft_weekday(draft: &Map<String, Value>) -> Option<Weekday> {
    draft
        .get("weekday")
        .and_then(|v| v.as_i64())
        .and_then(|n| Weekday::try_from(n).ok())
}

/// Reports a failed mutation to open views and builds the error response.
fn mutation_failed(
    state: &mut AppState,
    req: &Request,
    weekday: Option<Weekday>,
    code: &str,
    message: String,
    details: Option<Value>,
) -> Value {
    tracing::info!(method = %req.method, code, %message, "mutation rejected");
    state.dispatch(StoreEvent::MutationFailed {
        weekday,
        message: message.clone(),
    });
    err(&req.id, code, message, details)
}

fn validation_failed(
    state: &mut AppState,
    req: &Request,
    weekday: Option<Weekday>,
    errors: FieldErrors,
) -> Value {
    mutation_failed(
        state,
        req,
        weekday,
        "validation_failed",
        "lesson failed validation".to_string(),
        Some(json!({ "fields": errors })),
    )
}

fn handle_load(state: &mut AppState, req: &Request) -> Value {
    let weekday = match required_weekday(req) {
        Ok(w) => w,
        Err(e) => return e,
    };
    let Some(raw) = req.params.get("lessons") else {
        return err(&req.id, "bad_params", "missing lessons", None);
    };
    // Malformed times are rejected here so nothing downstream sees them.
    let lessons: Vec<Lesson> = match serde_json::from_value(raw.clone()) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "bad_params", format!("lessons: {}", e), None),
    };

    let count = state.store.load(weekday, lessons);
    tracing::info!(%weekday, count, "lessons loaded");
    let views = state.dispatch(StoreEvent::FetchSucceeded { weekday });
    ok(
        &req.id,
        json!({ "weekday": weekday, "count": count, "viewsUpdated": views }),
    )
}

fn handle_load_failed(state: &mut AppState, req: &Request) -> Value {
    let weekday = match required_weekday(req) {
        Ok(w) => w,
        Err(e) => return e,
    };
    let message = req
        .params
        .get("message")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_FETCH_FAILURE.to_string());

    tracing::warn!(%weekday, %message, "lesson fetch failed");
    let views = state.dispatch(StoreEvent::FetchFailed { weekday, message });
    ok(&req.id, json!({ "weekday": weekday, "viewsUpdated": views }))
}

fn handle_list(state: &mut AppState, req: &Request) -> Value {
    let weekday = match required_weekday(req) {
        Ok(w) => w,
        Err(e) => return e,
    };
    match state.store.day(weekday) {
        Some(lessons) => ok(&req.id, json!({ "weekday": weekday, "lessons": lessons })),
        None => err(
            &req.id,
            "not_loaded",
            format!("lessons for {} are not loaded", weekday),
            None,
        ),
    }
}

fn handle_create(state: &mut AppState, req: &Request) -> Value {
    let input = match required_object(req, "input") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let weekday = draft_weekday(input);
    let id = Uuid::new_v4().to_string();
    let drafted = lesson_from_draft(id, input, &state.config.hall_ids());
    let lesson = match drafted {
        Ok(l) => l,
        Err(errors) => return validation_failed(state, req, weekday, errors),
    };

    if let Err(e) = state.store.create(lesson.clone()) {
        return mutation_failed(state, req, weekday, e.code(), e.to_string(), None);
    }
    tracing::info!(lesson = %lesson.id, weekday = %lesson.weekday, hall = %lesson.hall, "lesson created");
    state.dispatch(StoreEvent::MutationSucceeded {
        weekday: lesson.weekday,
        record: Some(lesson.clone()),
    });
    ok(&req.id, json!({ "lessonId": lesson.id, "lesson": lesson }))
}

fn handle_update(state: &mut AppState, req: &Request) -> Value {
    let lesson_id = match required_str(req, "lessonId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let patch = match required_object(req, "patch") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(existing) = state.store.find(&lesson_id).cloned() else {
        return mutation_failed(
            state,
            req,
            None,
            "not_found",
            format!("lesson not found: {}", lesson_id),
            None,
        );
    };

    let mut draft = existing.to_draft();
    for (k, v) in patch {
        if k == "id" {
            continue;
        }
        draft.insert(canonical_field(k).to_string(), v.clone());
    }
    let drafted = lesson_from_draft(lesson_id, &draft, &state.config.hall_ids());
    let lesson = match drafted {
        Ok(l) => l,
        Err(errors) => return validation_failed(state, req, Some(existing.weekday), errors),
    };

    let old = match state.store.update(lesson.clone()) {
        Ok(old) => old,
        Err(e) => {
            return mutation_failed(
                state,
                req,
                Some(existing.weekday),
                e.code(),
                e.to_string(),
                None,
            )
        }
    };
    tracing::info!(lesson = %lesson.id, weekday = %lesson.weekday, "lesson updated");
    if old.weekday != lesson.weekday {
        state.dispatch(StoreEvent::MutationSucceeded {
            weekday: old.weekday,
            record: Some(old),
        });
    }
    state.dispatch(StoreEvent::MutationSucceeded {
        weekday: lesson.weekday,
        record: Some(lesson.clone()),
    });
    ok(&req.id, json!({ "lesson": lesson }))
}

fn handle_delete(state: &mut AppState, req: &Request) -> Value {
    let lesson_id = match required_str(req, "lessonId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let removed = match state.store.delete(&lesson_id) {
        Ok(l) => l,
        Err(e) => return mutation_failed(state, req, None, e.code(), e.to_string(), None),
    };
    tracing::info!(lesson = %removed.id, weekday = %removed.weekday, "lesson deleted");
    let weekday = removed.weekday;
    state.dispatch(StoreEvent::MutationSucceeded {
        weekday,
        record: Some(removed),
    });
    ok(&req.id, json!({ "lessonId": lesson_id, "weekday": weekday }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "routines.load" => Some(handle_load(state, req)),
        "routines.loadFailed" => Some(handle_load_failed(state, req)),
        "routines.list" => Some(handle_list(state, req)),
        "routines.create" => Some(handle_create(state, req)),
        "routines.update" => Some(handle_update(state, req)),
        "routines.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
