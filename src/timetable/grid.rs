use super::lesson::Lesson;
use super::time::TimeOfDay;
use super::TimetableError;
use serde::Serialize;

/// Ordered row boundaries of one hall column. Strictly increasing; the last
/// boundary is always the closing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GridAxis(Vec<TimeOfDay>);

impl GridAxis {
    /// Rows from `open` stepping by `interval` up to and including `close`.
    /// When the span is not a whole number of intervals, a shorter trailing
    /// row at exactly `close` is appended.
    pub fn generate(
        open: TimeOfDay,
        close: TimeOfDay,
        interval: u32,
    ) -> Result<Self, TimetableError> {
        if interval == 0 {
            return Err(TimetableError::ZeroInterval);
        }
        if open >= close {
            return Err(TimetableError::EmptyDay { open, close });
        }

        let mut rows = Vec::new();
        let mut current = u32::from(open.minutes());
        let close_min = u32::from(close.minutes());
        while current <= close_min {
            rows.push(TimeOfDay::from_minutes(i64::from(current))?);
            match current.checked_add(interval) {
                Some(next) => current = next,
                None => break,
            }
        }
        if rows.last().is_some_and(|last| *last < close) {
            rows.push(close);
        }
        Ok(GridAxis(rows))
    }

    pub fn rows(&self) -> &[TimeOfDay] {
        &self.0
    }
}

/// The "create lesson here" target of an empty cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub hall: String,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CellContent {
    Empty {
        slot: Slot,
    },
    #[serde(rename_all = "camelCase")]
    LessonBlock {
        lesson: Lesson,
        row_span: usize,
    },
    /// Hidden under a multi-row block higher in the column.
    Covered,
}

impl CellContent {
    pub fn lesson(&self) -> Option<&Lesson> {
        match self {
            CellContent::LessonBlock { lesson, .. } => Some(lesson),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HallColumn {
    pub hall: String,
    pub axis: GridAxis,
    pub cells: Vec<CellContent>,
}

impl HallColumn {
    fn empty(hall: &str, axis: GridAxis, interval: u32) -> Self {
        let rows = axis.rows();
        let cells = rows
            .iter()
            .enumerate()
            .map(|(i, start)| CellContent::Empty {
                slot: Slot {
                    hall: hall.to_string(),
                    start: *start,
                    end: rows
                        .get(i + 1)
                        .copied()
                        .unwrap_or_else(|| start.saturating_add(interval)),
                },
            })
            .collect();
        HallColumn {
            hall: hall.to_string(),
            axis,
            cells,
        }
    }
}

/// Hall columns in configured order. All columns share the same axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid {
    pub columns: Vec<HallColumn>,
}

impl Grid {
    pub fn column(&self, hall: &str) -> Option<&HallColumn> {
        self.columns.iter().find(|c| c.hall == hall)
    }

    pub fn column_mut(&mut self, hall: &str) -> Option<&mut HallColumn> {
        self.columns.iter_mut().find(|c| c.hall == hall)
    }

    /// Row boundaries shared by every column.
    pub fn times(&self) -> &[TimeOfDay] {
        self.columns
            .first()
            .map(|c| c.axis.rows())
            .unwrap_or_default()
    }

    /// Row-major view: one entry per time row with the cell of every hall in
    /// column order.
    pub fn rows(&self) -> Vec<(TimeOfDay, Vec<&CellContent>)> {
        self.times()
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let cells = self.columns.iter().filter_map(|c| c.cells.get(i)).collect();
                (*t, cells)
            })
            .collect()
    }
}

/// Empty grid skeleton: one column per hall, every cell `Empty`.
pub fn build(
    open: TimeOfDay,
    close: TimeOfDay,
    interval: u32,
    halls: &[String],
) -> Result<Grid, TimetableError> {
    let axis = GridAxis::generate(open, close, interval)?;
    let columns = halls
        .iter()
        .map(|hall| HallColumn::empty(hall, axis.clone(), interval))
        .collect();
    Ok(Grid { columns })
}
