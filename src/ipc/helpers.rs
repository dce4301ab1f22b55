use crate::ipc::error::err;
use crate::ipc::types::Request;
use crate::timetable::Weekday;
use serde_json::{Map, Value};

pub fn required_str(req: &Request, key: &str) -> Result<String, Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn required_object<'a>(req: &'a Request, key: &str) -> Result<&'a Map<String, Value>, Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_object())
        .ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("{} must be an object", key),
                None,
            )
        })
}

fn weekday_value(req: &Request, v: &Value) -> Result<Weekday, Value> {
    v.as_i64()
        .ok_or_else(|| "weekday must be integer".to_string())
        .and_then(|n| Weekday::try_from(n).map_err(|e| e.to_string()))
        .map_err(|m| err(&req.id, "bad_params", m, None))
}

pub fn required_weekday(req: &Request) -> Result<Weekday, Value> {
    match req.params.get("weekday") {
        None | Some(Value::Null) => Err(err(&req.id, "bad_params", "missing weekday", None)),
        Some(v) => weekday_value(req, v),
    }
}

pub fn optional_weekday(req: &Request) -> Result<Option<Weekday>, Value> {
    match req.params.get("weekday") {
        None | Some(Value::Null) => Ok(None),
        Some(v) => weekday_value(req, v).map(Some),
    }
}

pub fn required_index(req: &Request, key: &str) -> Result<usize, Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_u64())
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("{} must be a non-negative integer", key),
                None,
            )
        })
}
