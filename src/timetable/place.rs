use super::grid::{CellContent, HallColumn};
use super::lesson::Lesson;
use super::snap::snap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// No column for the lesson's hall.
    UnknownHall,
    StartOutsideDay,
    EndOutsideDay,
    /// Both ends snapped to the same row, or the end snapped above the start.
    EmptySpan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlacementOutcome {
    #[serde(rename_all = "camelCase")]
    Placed {
        start_row: usize,
        row_span: usize,
        /// Lessons whose blocks were overwritten by this one.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        displaced: Vec<String>,
    },
    Dropped { reason: DropReason },
}

impl PlacementOutcome {
    pub fn dropped(reason: DropReason) -> Self {
        PlacementOutcome::Dropped { reason }
    }
}

/// Writes `lesson` into `column`.
///
/// The block goes on the start row and the rows it spans below are marked
/// `Covered`. Anything already there is overwritten; the ids of lessons whose
/// blocks get replaced are returned in the outcome. A lesson that cannot be
/// snapped or spans no rows leaves the column untouched.
pub fn place(lesson: &Lesson, column: &mut HallColumn, interval: u32) -> PlacementOutcome {
    let Some(start_row) = snap(lesson.time_start, &column.axis, interval) else {
        return PlacementOutcome::dropped(DropReason::StartOutsideDay);
    };
    let Some(end_row) = snap(lesson.time_end, &column.axis, interval) else {
        return PlacementOutcome::dropped(DropReason::EndOutsideDay);
    };
    if end_row <= start_row {
        return PlacementOutcome::dropped(DropReason::EmptySpan);
    }
    let row_span = end_row - start_row;

    let mut displaced = Vec::new();
    for (offset, cell) in column
        .cells
        .iter_mut()
        .skip(start_row)
        .take(row_span)
        .enumerate()
    {
        if let Some(prev) = cell.lesson() {
            displaced.push(prev.id.clone());
        }
        *cell = if offset == 0 {
            CellContent::LessonBlock {
                lesson: lesson.clone(),
                row_span,
            }
        } else {
            CellContent::Covered
        };
    }

    PlacementOutcome::Placed {
        start_row,
        row_span,
        displaced,
    }
}
