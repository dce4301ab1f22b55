use crate::timetable::{GridConfig, TimeOfDay};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;

pub const CONFIG_ENV: &str = "STUDIOD_CONFIG";

const INTERVAL_MIN: u32 = 5;
const INTERVAL_MAX: u32 = 240;
const HALL_LABEL_MAX: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hall {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TimetableConfig {
    pub open_time: TimeOfDay,
    pub close_time: TimeOfDay,
    pub interval_minutes: u32,
    pub halls: Vec<Hall>,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        let hall = |id: &str, label: &str| Hall {
            id: id.to_string(),
            label: label.to_string(),
        };
        TimetableConfig {
            open_time: TimeOfDay::from_minutes(9 * 60).unwrap_or(TimeOfDay::MIDNIGHT),
            close_time: TimeOfDay::from_minutes(21 * 60).unwrap_or(TimeOfDay::LAST_MINUTE),
            interval_minutes: 30,
            halls: vec![
                hall("blue", "Blue"),
                hall("green", "Green"),
                hall("pylon", "Pylon"),
                hall("orange", "Orange"),
                hall("supernova", "Supernova"),
                hall("big", "Big"),
                hall("house", "House"),
            ],
        }
    }
}

impl TimetableConfig {
    /// Reads the file named by `STUDIOD_CONFIG`, or the defaults when the
    /// variable is unset.
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read timetable config {}", path.display()))?;
        let cfg: TimetableConfig = serde_json::from_str(&text)
            .with_context(|| format!("parse timetable config {}", path.display()))?;
        cfg.validate()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid timetable config {}", path.display()))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.open_time >= self.close_time {
            return Err("openTime must be before closeTime".into());
        }
        if !(INTERVAL_MIN..=INTERVAL_MAX).contains(&self.interval_minutes) {
            return Err(format!(
                "intervalMinutes must be in {}..={}",
                INTERVAL_MIN, INTERVAL_MAX
            ));
        }
        if self.halls.is_empty() {
            return Err("at least one hall is required".into());
        }
        let mut seen = HashSet::new();
        for hall in &self.halls {
            if hall.id.trim().is_empty() {
                return Err("hall id must not be empty".into());
            }
            if hall.label.chars().count() > HALL_LABEL_MAX {
                return Err(format!("hall label length must be <= {}", HALL_LABEL_MAX));
            }
            if !seen.insert(hall.id.as_str()) {
                return Err(format!("duplicate hall id: {}", hall.id));
            }
        }
        Ok(())
    }

    pub fn grid(&self) -> GridConfig {
        GridConfig {
            open: self.open_time,
            close: self.close_time,
            interval: self.interval_minutes,
            halls: self.halls.iter().map(|h| h.id.clone()).collect(),
        }
    }

    pub fn hall_ids(&self) -> Vec<&str> {
        self.halls.iter().map(|h| h.id.as_str()).collect()
    }

    /// Returns a copy with `patch` applied. Only known fields are accepted and
    /// the result must still validate.
    pub fn patched(&self, patch: &Map<String, Value>) -> Result<Self, String> {
        let mut next = self.clone();
        for (k, v) in patch {
            match k.as_str() {
                "openTime" => next.open_time = parse_time(v, k)?,
                "closeTime" => next.close_time = parse_time(v, k)?,
                "intervalMinutes" => {
                    let n = v
                        .as_u64()
                        .ok_or_else(|| format!("{} must be a positive integer", k))?;
                    next.interval_minutes =
                        u32::try_from(n).map_err(|_| format!("{} is too large", k))?;
                }
                "halls" => {
                    next.halls = serde_json::from_value(v.clone())
                        .map_err(|_| "halls must be an array of {id, label}".to_string())?;
                    for hall in &mut next.halls {
                        hall.id = hall.id.trim().to_string();
                        hall.label = hall.label.trim().to_string();
                    }
                }
                _ => return Err(format!("unknown timetable field: {}", k)),
            }
        }
        next.validate()?;
        Ok(next)
    }
}

fn parse_time(v: &Value, key: &str) -> Result<TimeOfDay, String> {
    v.as_str()
        .ok_or_else(|| format!("{} must be string", key))?
        .parse()
        .map_err(|e| format!("{}: {}", key, e))
}
