//! Weekly timetable layout.
//!
//! Lessons come in as a flat list; [`schedule::rebuild`] turns one weekday of
//! them into a [`grid::Grid`] of time rows × hall columns. Row boundaries come from
//! [`grid::build`], lesson ends are pulled onto rows by [`snap::snap`], and
//! [`place::place`] writes the spanning cells. [`ScheduleView`] tracks the
//! loading/ready/error lifecycle of one weekday tab.
//!
//! Nothing in here does I/O or keeps state between rebuilds.

pub mod grid;
pub mod lesson;
pub mod place;
pub mod schedule;
pub mod snap;
pub mod time;

pub use grid::CellContent;
pub use lesson::{lesson_from_draft, FieldErrors, Lesson};
pub use schedule::{GridConfig, ScheduleView, StoreEvent, ViewState};
pub use time::{TimeOfDay, Weekday};

use time::TimeParseError;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimetableError {
    #[error("row interval must be positive")]
    ZeroInterval,
    #[error("opening time {open} must be before closing time {close}")]
    EmptyDay { open: TimeOfDay, close: TimeOfDay },
    #[error(transparent)]
    Time(#[from] TimeParseError),
}
