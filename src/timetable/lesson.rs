use super::time::{TimeOfDay, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const COMMENT_MAX_CHARS: usize = 255;
/// A lesson must last strictly longer than this.
pub const MIN_LESSON_MINUTES: i32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonKind {
    #[default]
    Common,
    Mini,
    Lease,
    Repetition,
}

impl LessonKind {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "common" => Some(Self::Common),
            "mini" => Some(Self::Mini),
            "lease" => Some(Self::Lease),
            "repetition" => Some(Self::Repetition),
            _ => None,
        }
    }
}

/// A weekly booking: one hall, one weekday, a start and an end time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub hall: String,
    pub weekday: Weekday,
    #[serde(alias = "time_start")]
    pub time_start: TimeOfDay,
    #[serde(alias = "time_end")]
    pub time_end: TimeOfDay,
    #[serde(
        default,
        alias = "logbook_id",
        deserialize_with = "de_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub logbook_id: Option<String>,
    #[serde(default)]
    pub comment: String,
    #[serde(default, rename = "type")]
    pub kind: LessonKind,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> String {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

// The booking API hands out integer ids; lessons created here get UUIDs.
fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

fn de_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

/// Field name → message. Empty means the draft is valid.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Validates a create/update form payload into a lesson.
///
/// `known_halls` restricts `hall` to configured columns. Field names match the
/// wire format (`timeStart`, `logbookId`, ...); snake_case spellings are
/// accepted too.
pub fn lesson_from_draft(
    id: String,
    draft: &Map<String, Value>,
    known_halls: &[&str],
) -> Result<Lesson, FieldErrors> {
    let mut errors = FieldErrors::new();

    let weekday = match field(draft, "weekday", "weekday") {
        None => {
            errors.insert("weekday", "this field is required".into());
            None
        }
        Some(v) => match v.as_i64().map(Weekday::try_from) {
            Some(Ok(w)) => Some(w),
            _ => {
                errors.insert("weekday", "weekday must be an integer 0..=6".into());
                None
            }
        },
    };

    let hall = match field(draft, "hall", "hall").and_then(|v| v.as_str()) {
        Some(h) if !h.trim().is_empty() => {
            let h = h.trim();
            if known_halls.contains(&h) {
                Some(h.to_string())
            } else {
                errors.insert("hall", format!("unknown hall: {}", h));
                None
            }
        }
        _ => {
            errors.insert("hall", "this field is required".into());
            None
        }
    };

    let time_start = draft_time(draft, "timeStart", "time_start", &mut errors);
    let time_end = draft_time(draft, "timeEnd", "time_end", &mut errors);
    if let (Some(start), Some(end)) = (time_start, time_end) {
        let length = start.minutes_until(end);
        if length == 0 {
            errors.insert("timeStart", "lesson has no duration".into());
        } else if length < 0 {
            errors.insert("timeStart", "lesson ends before it starts".into());
        } else if length <= MIN_LESSON_MINUTES {
            errors.insert("timeStart", "lesson is too short".into());
        }
    }

    let kind = match field(draft, "type", "type") {
        None | Some(Value::Null) => Some(LessonKind::default()),
        Some(v) => match v.as_str().and_then(LessonKind::parse) {
            Some(k) => Some(k),
            None => {
                errors.insert(
                    "type",
                    "type must be one of: common, mini, lease, repetition".into(),
                );
                None
            }
        },
    };

    let logbook_id = match field(draft, "logbookId", "logbook_id") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(_) => {
            errors.insert("logbookId", "logbookId must be string, integer or null".into());
            None
        }
    };

    let comment = match field(draft, "comment", "comment") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => {
            if s.chars().count() > COMMENT_MAX_CHARS {
                errors.insert(
                    "comment",
                    format!("comment length must be <= {}", COMMENT_MAX_CHARS),
                );
            }
            s.trim().to_string()
        }
        Some(_) => {
            errors.insert("comment", "comment must be string".into());
            String::new()
        }
    };

    match (weekday, hall, time_start, time_end, kind) {
        (Some(weekday), Some(hall), Some(time_start), Some(time_end), Some(kind))
            if errors.is_empty() =>
        {
            Ok(Lesson {
                id,
                hall,
                weekday,
                time_start,
                time_end,
                logbook_id,
                comment,
                kind,
            })
        }
        _ => Err(errors),
    }
}

impl Lesson {
    /// The lesson as a draft object, so an update can overlay a patch and
    /// re-run the same validation as a create.
    pub fn to_draft(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut obj)) => {
                obj.remove("id");
                obj
            }
            _ => Map::new(),
        }
    }
}

/// Wire name of a draft field, folding the snake_case spellings the booking
/// API uses onto the camelCase ones.
pub fn canonical_field(key: &str) -> &str {
    match key {
        "time_start" => "timeStart",
        "time_end" => "timeEnd",
        "logbook_id" => "logbookId",
        other => other,
    }
}

fn field<'a>(draft: &'a Map<String, Value>, camel: &str, snake: &str) -> Option<&'a Value> {
    draft.get(camel).or_else(|| draft.get(snake))
}

fn draft_time(
    draft: &Map<String, Value>,
    camel: &'static str,
    snake: &str,
    errors: &mut FieldErrors,
) -> Option<TimeOfDay> {
    let Some(raw) = field(draft, camel, snake).and_then(|v| v.as_str()) else {
        errors.insert(camel, "this field is required".into());
        return None;
    };
    match raw.parse::<TimeOfDay>() {
        Ok(t) => Some(t),
        Err(_) => {
            errors.insert(camel, "invalid time format, expected HH:mm".into());
            None
        }
    }
}
