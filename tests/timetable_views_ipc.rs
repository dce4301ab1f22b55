mod test_support;

use serde_json::json;
use test_support::{cell, cell_kind, error_code, request, request_ok, spawn_sidecar};

#[test]
fn weekday_view_loads_then_lays_out_lessons() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "timetable.open",
        json!({ "weekday": 0 }),
    );
    assert_eq!(opened.get("state").and_then(|v| v.as_str()), Some("loading"));
    assert_eq!(opened.get("needsFetch").and_then(|v| v.as_bool()), Some(true));
    let view_id = opened
        .get("viewId")
        .and_then(|v| v.as_str())
        .expect("viewId")
        .to_string();

    let pending = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "timetable.get",
        json!({ "viewId": view_id.clone() }),
    );
    assert_eq!(pending.get("state").and_then(|v| v.as_str()), Some("loading"));
    assert!(pending.get("rows").is_none());

    let loaded = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "routines.load",
        json!({
            "weekday": 0,
            "lessons": [
                { "id": 1, "hall": "blue", "weekday": 0, "timeStart": "09:10", "timeEnd": "10:05" },
                { "id": 2, "hall": "green", "weekday": 0, "time_start": "09:20:00", "time_end": "09:20:00" },
                { "id": 3, "hall": "blue", "weekday": 1, "timeStart": "12:00", "timeEnd": "13:00" }
            ]
        }),
    );
    assert_eq!(loaded.get("count").and_then(|v| v.as_u64()), Some(2));
    assert_eq!(loaded.get("viewsUpdated").and_then(|v| v.as_u64()), Some(1));

    let ready = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "timetable.get",
        json!({ "viewId": view_id.clone() }),
    );
    assert_eq!(ready.get("state").and_then(|v| v.as_str()), Some("ready"));
    let rows = ready.get("rows").and_then(|v| v.as_array()).expect("rows");
    assert_eq!(rows.len(), 25);
    assert_eq!(rows[0].get("time").and_then(|v| v.as_str()), Some("09:00"));
    assert_eq!(rows[24].get("time").and_then(|v| v.as_str()), Some("21:00"));
    assert_eq!(
        ready
            .get("halls")
            .and_then(|v| v.as_array())
            .map(|h| h.len()),
        Some(7)
    );

    let block = cell(&ready, 0, 0);
    assert_eq!(block.get("kind").and_then(|v| v.as_str()), Some("lessonBlock"));
    assert_eq!(block.get("rowSpan").and_then(|v| v.as_u64()), Some(2));
    assert_eq!(
        block
            .get("lesson")
            .and_then(|l| l.get("id"))
            .and_then(|v| v.as_str()),
        Some("1")
    );
    assert_eq!(cell_kind(&ready, 1, 0), "covered");
    assert_eq!(cell_kind(&ready, 2, 0), "empty");
    // The zero-length green lesson leaves its column untouched.
    assert_eq!(cell_kind(&ready, 0, 1), "empty");
    assert_eq!(cell_kind(&ready, 1, 1), "empty");

    let dropped = ready.get("dropped").and_then(|v| v.as_array()).expect("dropped");
    assert_eq!(dropped.len(), 1);
    assert_eq!(dropped[0].get("lessonId").and_then(|v| v.as_str()), Some("2"));
    assert_eq!(dropped[0].get("reason").and_then(|v| v.as_str()), Some("empty_span"));

    let placements = ready
        .get("placements")
        .and_then(|v| v.as_array())
        .expect("placements");
    assert_eq!(placements.len(), 2);
    assert_eq!(placements[0].get("status").and_then(|v| v.as_str()), Some("placed"));
    assert_eq!(placements[0].get("startRow").and_then(|v| v.as_u64()), Some(0));
}

#[test]
fn overlapping_lessons_keep_the_later_one() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "routines.load",
        json!({
            "weekday": 2,
            "lessons": [
                { "id": "a", "hall": "pylon", "weekday": 2, "timeStart": "09:00", "timeEnd": "09:30" },
                { "id": "b", "hall": "pylon", "weekday": 2, "timeStart": "09:05", "timeEnd": "09:25" },
                { "id": "c", "hall": "red", "weekday": 2, "timeStart": "10:00", "timeEnd": "11:00" }
            ]
        }),
    );
    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "timetable.open",
        json!({ "weekday": 2 }),
    );
    assert_eq!(opened.get("state").and_then(|v| v.as_str()), Some("ready"));
    assert_eq!(opened.get("needsFetch").and_then(|v| v.as_bool()), Some(false));
    let view_id = opened.get("viewId").and_then(|v| v.as_str()).expect("viewId");

    let view = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "timetable.get",
        json!({ "viewId": view_id }),
    );
    // pylon is the third configured hall.
    assert_eq!(
        cell(&view, 0, 2)
            .get("lesson")
            .and_then(|l| l.get("id"))
            .and_then(|v| v.as_str()),
        Some("b")
    );
    let placements = view
        .get("placements")
        .and_then(|v| v.as_array())
        .expect("placements");
    assert_eq!(placements[1].get("displaced"), Some(&json!(["a"])));

    let dropped = view.get("dropped").and_then(|v| v.as_array()).expect("dropped");
    assert_eq!(dropped.len(), 1);
    assert_eq!(dropped[0].get("reason").and_then(|v| v.as_str()), Some("unknown_hall"));
}

#[test]
fn fetch_failure_leaves_view_in_error() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "timetable.open",
        json!({ "weekday": 3 }),
    );
    let view_id = opened
        .get("viewId")
        .and_then(|v| v.as_str())
        .expect("viewId")
        .to_string();

    let failed = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "routines.loadFailed",
        json!({ "weekday": 3, "message": "network timeout" }),
    );
    assert_eq!(failed.get("viewsUpdated").and_then(|v| v.as_u64()), Some(1));

    let view = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "timetable.get",
        json!({ "viewId": view_id.clone() }),
    );
    assert_eq!(view.get("state").and_then(|v| v.as_str()), Some("error"));
    assert_eq!(
        view.get("error").and_then(|v| v.as_str()),
        Some("network timeout")
    );
    assert!(view.get("rows").is_none());

    // A later successful fetch does not revive the errored view.
    let loaded = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "routines.load",
        json!({ "weekday": 3, "lessons": [] }),
    );
    assert_eq!(loaded.get("viewsUpdated").and_then(|v| v.as_u64()), Some(0));
    let still = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "timetable.get",
        json!({ "viewId": view_id }),
    );
    assert_eq!(still.get("state").and_then(|v| v.as_str()), Some("error"));

    let fresh = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "timetable.open",
        json!({ "weekday": 3 }),
    );
    assert_eq!(fresh.get("state").and_then(|v| v.as_str()), Some("ready"));
}

#[test]
fn events_for_other_weekdays_do_not_touch_a_view() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let monday = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "timetable.open",
        json!({ "weekday": 0 }),
    );
    let _tuesday = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "timetable.open",
        json!({ "weekday": 1 }),
    );
    let loaded = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "routines.load",
        json!({ "weekday": 1, "lessons": [] }),
    );
    assert_eq!(loaded.get("viewsUpdated").and_then(|v| v.as_u64()), Some(1));

    let view = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "timetable.get",
        json!({ "viewId": monday.get("viewId").cloned().expect("viewId") }),
    );
    assert_eq!(view.get("state").and_then(|v| v.as_str()), Some("loading"));
}

#[test]
fn empty_cell_prefills_the_create_form() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "timetable.open",
        json!({ "weekday": 4 }),
    );
    let view_id = opened
        .get("viewId")
        .and_then(|v| v.as_str())
        .expect("viewId")
        .to_string();

    let not_ready = request(
        &mut stdin,
        &mut reader,
        "2",
        "timetable.slot",
        json!({ "viewId": view_id.clone(), "hall": "blue", "row": 0 }),
    );
    assert_eq!(error_code(&not_ready), Some("not_ready"));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "routines.load",
        json!({
            "weekday": 4,
            "lessons": [
                { "id": 10, "hall": "blue", "weekday": 4, "timeStart": "09:00", "timeEnd": "10:00" }
            ]
        }),
    );

    let slot = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "timetable.slot",
        json!({ "viewId": view_id.clone(), "hall": "green", "row": 3 }),
    );
    assert_eq!(
        slot,
        json!({ "weekday": 4, "hall": "green", "timeStart": "10:30", "timeEnd": "11:00" })
    );

    let last = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "timetable.slot",
        json!({ "viewId": view_id.clone(), "hall": "house", "row": 23 }),
    );
    assert_eq!(last.get("timeStart").and_then(|v| v.as_str()), Some("20:30"));
    assert_eq!(last.get("timeEnd").and_then(|v| v.as_str()), Some("21:00"));

    let closing = request(
        &mut stdin,
        &mut reader,
        "5b",
        "timetable.slot",
        json!({ "viewId": view_id.clone(), "hall": "house", "row": 24 }),
    );
    assert_eq!(error_code(&closing), Some("bad_params"));

    let occupied = request(
        &mut stdin,
        &mut reader,
        "6",
        "timetable.slot",
        json!({ "viewId": view_id.clone(), "hall": "blue", "row": 1 }),
    );
    assert_eq!(error_code(&occupied), Some("bad_params"));

    let unknown_hall = request(
        &mut stdin,
        &mut reader,
        "7",
        "timetable.slot",
        json!({ "viewId": view_id.clone(), "hall": "attic", "row": 0 }),
    );
    assert_eq!(error_code(&unknown_hall), Some("not_found"));

    let out_of_range = request(
        &mut stdin,
        &mut reader,
        "8",
        "timetable.slot",
        json!({ "viewId": view_id, "hall": "blue", "row": 25 }),
    );
    assert_eq!(error_code(&out_of_range), Some("bad_params"));
}

#[test]
fn closed_view_is_gone() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "timetable.open",
        json!({ "weekday": 6 }),
    );
    let view_id = opened
        .get("viewId")
        .and_then(|v| v.as_str())
        .expect("viewId")
        .to_string();

    let closed = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "timetable.close",
        json!({ "viewId": view_id.clone() }),
    );
    assert_eq!(closed.get("closed").and_then(|v| v.as_bool()), Some(true));

    let gone = request(
        &mut stdin,
        &mut reader,
        "3",
        "timetable.get",
        json!({ "viewId": view_id.clone() }),
    );
    assert_eq!(error_code(&gone), Some("not_found"));

    let health = request_ok(&mut stdin, &mut reader, "4", "health", json!({}));
    assert_eq!(health.get("openViews").and_then(|v| v.as_u64()), Some(0));
    assert_eq!(health.get("subscriptions").and_then(|v| v.as_u64()), Some(0));

    let loaded = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "routines.load",
        json!({ "weekday": 6, "lessons": [] }),
    );
    assert_eq!(loaded.get("viewsUpdated").and_then(|v| v.as_u64()), Some(0));
}

#[test]
fn malformed_lessons_are_rejected_at_load() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let bad = request(
        &mut stdin,
        &mut reader,
        "1",
        "routines.load",
        json!({
            "weekday": 0,
            "lessons": [{ "id": 1, "hall": "blue", "weekday": 0, "timeStart": "9am", "timeEnd": "10:00" }]
        }),
    );
    assert_eq!(error_code(&bad), Some("bad_params"));

    let bad_weekday = request(
        &mut stdin,
        &mut reader,
        "2",
        "timetable.open",
        json!({ "weekday": 7 }),
    );
    assert_eq!(error_code(&bad_weekday), Some("bad_params"));

    let list = request(
        &mut stdin,
        &mut reader,
        "3",
        "routines.list",
        json!({ "weekday": 0 }),
    );
    assert_eq!(error_code(&list), Some("not_loaded"));
}
