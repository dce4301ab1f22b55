#![allow(dead_code)]

use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn(config: Option<&Path>) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_studiod");
    let mut cmd = Command::new(exe);
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .env_remove("STUDIOD_CONFIG");
    if let Some(path) = config {
        cmd.env("STUDIOD_CONFIG", path);
    }
    let mut child = cmd.spawn().expect("spawn studiod");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

pub fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    spawn(None)
}

pub fn spawn_sidecar_with_config(path: &Path) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    spawn(Some(path))
}

pub fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

pub fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or(serde_json::Value::Null)
}

/// Error code of a failed response.
pub fn error_code(value: &serde_json::Value) -> Option<&str> {
    assert_eq!(value.get("ok").and_then(|v| v.as_bool()), Some(false), "{}", value);
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
}

/// Cell `hall_index` of row `row` in a `timetable.get` result.
pub fn cell<'a>(view: &'a serde_json::Value, row: usize, hall_index: usize) -> &'a serde_json::Value {
    view.get("rows")
        .and_then(|r| r.get(row))
        .and_then(|r| r.get("cells"))
        .and_then(|c| c.get(hall_index))
        .unwrap_or_else(|| panic!("no cell at row {} hall {}", row, hall_index))
}

pub fn cell_kind(view: &serde_json::Value, row: usize, hall_index: usize) -> String {
    cell(view, row, hall_index)
        .get("kind")
        .and_then(|v| v.as_str())
        .expect("cell kind")
        .to_string()
}
