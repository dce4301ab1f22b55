pub mod core;
pub mod routines;
pub mod setup;
pub mod timetable;
