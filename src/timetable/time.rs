use chrono::{Datelike, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("time must be HH:mm, got {0:?}")]
    Format(String),
    #[error("minute offset {0} is outside 0..1440")]
    OutOfRange(i64),
    #[error("weekday must be 0..=6 (Monday = 0), got {0}")]
    Weekday(i64),
}

/// Minutes since midnight. Lesson times and grid rows all use this after
/// ingestion; `HH:mm` text only exists at the JSON boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const LAST_MINUTE: TimeOfDay = TimeOfDay(MINUTES_PER_DAY - 1);

    pub fn from_minutes(minutes: i64) -> Result<Self, TimeParseError> {
        if (0..i64::from(MINUTES_PER_DAY)).contains(&minutes) {
            Ok(TimeOfDay(minutes as u16))
        } else {
            Err(TimeParseError::OutOfRange(minutes))
        }
    }

    #[cfg(test)]
    pub fn hm(hour: u16, minute: u16) -> Result<Self, TimeParseError> {
        Self::from_minutes(i64::from(hour) * 60 + i64::from(minute))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    /// Adds `minutes`, clamping at 23:59.
    pub fn saturating_add(self, minutes: u32) -> Self {
        let sum = u32::from(self.0).saturating_add(minutes);
        TimeOfDay(sum.min(u32::from(Self::LAST_MINUTE.0)) as u16)
    }

    pub fn minutes_until(self, later: TimeOfDay) -> i32 {
        i32::from(later.0) - i32::from(self.0)
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    // Accepts `HH:mm` and the `HH:mm:ss` form the booking API stores; seconds
    // are dropped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let parsed = NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(|_| TimeParseError::Format(s.to_string()))?;
        Ok(TimeOfDay((parsed.hour() * 60 + parsed.minute()) as u16))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Day of the week, Monday = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Weekday(u8);

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday(0),
        Weekday(1),
        Weekday(2),
        Weekday(3),
        Weekday(4),
        Weekday(5),
        Weekday(6),
    ];

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn today() -> Self {
        Weekday::from(chrono::Local::now().weekday())
    }
}

impl TryFrom<i64> for Weekday {
    type Error = TimeParseError;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        if (0..=6).contains(&v) {
            Ok(Weekday(v as u8))
        } else {
            Err(TimeParseError::Weekday(v))
        }
    }
}

impl From<Weekday> for u8 {
    fn from(w: Weekday) -> u8 {
        w.0
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(w: chrono::Weekday) -> Self {
        Weekday(w.num_days_from_monday() as u8)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
        f.write_str(NAMES[usize::from(self.0)])
    }
}
