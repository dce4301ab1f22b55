use super::grid::{build, Grid};
use super::lesson::Lesson;
use super::place::{place, DropReason, PlacementOutcome};
use super::time::{TimeOfDay, Weekday};
use super::TimetableError;
use serde::Serialize;

/// Everything a rebuild needs besides the lessons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridConfig {
    pub open: TimeOfDay,
    pub close: TimeOfDay,
    pub interval: u32,
    pub halls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub lesson_id: String,
    pub hall: String,
    #[serde(flatten)]
    pub outcome: PlacementOutcome,
}

/// The laid-out timetable of one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub weekday: Weekday,
    pub grid: Grid,
    /// One entry per lesson of the weekday, in placement order.
    pub placements: Vec<Placement>,
}

impl Schedule {
    pub fn dropped(&self) -> impl Iterator<Item = (&Placement, DropReason)> {
        self.placements.iter().filter_map(|p| match p.outcome {
            PlacementOutcome::Dropped { reason } => Some((p, reason)),
            PlacementOutcome::Placed { .. } => None,
        })
    }
}

/// Lays out every lesson of `weekday` on a fresh grid.
///
/// Lessons of other weekdays are skipped. Lessons are placed in the order
/// given, so when two overlap in one hall the later one wins.
pub fn rebuild(
    lessons: &[Lesson],
    weekday: Weekday,
    config: &GridConfig,
) -> Result<Schedule, TimetableError> {
    let mut grid = build(config.open, config.close, config.interval, &config.halls)?;
    let mut placements = Vec::new();

    for lesson in lessons.iter().filter(|l| l.weekday == weekday) {
        let outcome = match grid.column_mut(&lesson.hall) {
            Some(column) => place(lesson, column, config.interval),
            None => PlacementOutcome::dropped(DropReason::UnknownHall),
        };
        placements.push(Placement {
            lesson_id: lesson.id.clone(),
            hall: lesson.hall.clone(),
            outcome,
        });
    }

    Ok(Schedule {
        weekday,
        grid,
        placements,
    })
}

/// Completions of the asynchronous work a weekday view waits on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    FetchSucceeded {
        weekday: Weekday,
    },
    FetchFailed {
        weekday: Weekday,
        message: String,
    },
    MutationSucceeded {
        weekday: Weekday,
        record: Option<Lesson>,
    },
    /// A failed create/update/delete. `weekday` is `None` when the request
    /// never got far enough to name one.
    MutationFailed {
        weekday: Option<Weekday>,
        message: String,
    },
}

impl StoreEvent {
    pub fn weekday(&self) -> Option<Weekday> {
        match self {
            StoreEvent::FetchSucceeded { weekday }
            | StoreEvent::FetchFailed { weekday, .. }
            | StoreEvent::MutationSucceeded { weekday, .. } => Some(*weekday),
            StoreEvent::MutationFailed { weekday, .. } => *weekday,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StoreEvent::FetchSucceeded { .. } => "fetch-success",
            StoreEvent::FetchFailed { .. } => "fetch-fail",
            StoreEvent::MutationSucceeded { .. } => "mutation-success",
            StoreEvent::MutationFailed { .. } => "mutation-fail",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading,
    Ready,
    Error { message: String },
}

impl ViewState {
    pub fn name(&self) -> &'static str {
        match self {
            ViewState::Idle => "idle",
            ViewState::Loading => "loading",
            ViewState::Ready => "ready",
            ViewState::Error { .. } => "error",
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ViewState::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// One weekday tab. Lives from `timetable.open` to `timetable.close`.
///
/// Idle → Loading → Ready | Error. Ready only ever moves to Ready again and
/// Error is final; the only way back to Loading is a new view.
#[derive(Debug, Clone)]
pub struct ScheduleView {
    weekday: Weekday,
    state: ViewState,
    schedule: Option<Schedule>,
    notices: Vec<String>,
}

impl ScheduleView {
    pub fn new(weekday: Weekday) -> Self {
        ScheduleView {
            weekday,
            state: ViewState::Idle,
            schedule: None,
            notices: Vec::new(),
        }
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_ref()
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    /// Leaves Idle: straight to Ready when the weekday's lessons are already
    /// cached, otherwise Loading until a fetch completes.
    pub fn activate(
        &mut self,
        cached: Option<&[Lesson]>,
        config: &GridConfig,
    ) -> Result<&ViewState, TimetableError> {
        if self.state == ViewState::Idle {
            match cached {
                Some(lessons) => self.rebuild(lessons, config)?,
                None => self.state = ViewState::Loading,
            }
        }
        Ok(&self.state)
    }

    /// Applies one event. `lessons` is the full current lesson set of this
    /// view's weekday, if one is cached. Returns whether the view changed.
    pub fn handle(
        &mut self,
        event: &StoreEvent,
        lessons: Option<&[Lesson]>,
        config: &GridConfig,
    ) -> Result<bool, TimetableError> {
        if event.weekday().is_some_and(|w| w != self.weekday) {
            return Ok(false);
        }
        match (&self.state, event) {
            (ViewState::Loading | ViewState::Ready, StoreEvent::FetchSucceeded { .. })
            | (ViewState::Ready, StoreEvent::MutationSucceeded { .. }) => {
                self.rebuild(lessons.unwrap_or_default(), config)?;
                Ok(true)
            }
            (ViewState::Loading, StoreEvent::FetchFailed { message, .. }) => {
                self.state = ViewState::Error {
                    message: message.clone(),
                };
                Ok(true)
            }
            (_, StoreEvent::MutationFailed { message, .. }) => {
                self.notices.push(message.clone());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Re-lays out a Ready view, e.g. after the grid settings changed.
    pub fn refresh(
        &mut self,
        lessons: Option<&[Lesson]>,
        config: &GridConfig,
    ) -> Result<(), TimetableError> {
        if self.state == ViewState::Ready {
            self.rebuild(lessons.unwrap_or_default(), config)?;
        }
        Ok(())
    }

    fn rebuild(&mut self, lessons: &[Lesson], config: &GridConfig) -> Result<(), TimetableError> {
        self.schedule = Some(rebuild(lessons, self.weekday, config)?);
        self.state = ViewState::Ready;
        Ok(())
    }
}
