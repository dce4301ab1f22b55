use crate::timetable::{Lesson, Weekday};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("lessons for {0} are not loaded")]
    NotLoaded(Weekday),
    #[error("lesson not found: {0}")]
    NotFound(String),
    #[error("lesson id already exists: {0}")]
    DuplicateId(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotLoaded(_) => "not_loaded",
            StoreError::NotFound(_) => "not_found",
            StoreError::DuplicateId(_) => "bad_params",
        }
    }
}

/// Per-weekday lesson cache. A weekday with no entry has never been fetched.
#[derive(Debug, Default)]
pub struct LessonStore {
    days: HashMap<Weekday, Vec<Lesson>>,
}

impl LessonStore {
    pub fn day(&self, weekday: Weekday) -> Option<&[Lesson]> {
        self.days.get(&weekday).map(Vec::as_slice)
    }

    /// Replaces the cached lessons of `weekday`. Lessons filed under another
    /// weekday are left out.
    pub fn load(&mut self, weekday: Weekday, lessons: Vec<Lesson>) -> usize {
        let lessons: Vec<Lesson> = lessons
            .into_iter()
            .filter(|l| l.weekday == weekday)
            .collect();
        let count = lessons.len();
        self.days.insert(weekday, lessons);
        count
    }

    pub fn find(&self, id: &str) -> Option<&Lesson> {
        self.days.values().flatten().find(|l| l.id == id)
    }

    pub fn create(&mut self, lesson: Lesson) -> Result<(), StoreError> {
        if self.find(&lesson.id).is_some() {
            return Err(StoreError::DuplicateId(lesson.id));
        }
        let day = self
            .days
            .get_mut(&lesson.weekday)
            .ok_or(StoreError::NotLoaded(lesson.weekday))?;
        day.push(lesson);
        Ok(())
    }

    /// Swaps in `lesson` for the stored lesson with the same id and returns
    /// the old one. A weekday change moves it to the end of the new day.
    pub fn update(&mut self, lesson: Lesson) -> Result<Lesson, StoreError> {
        let old_weekday = self
            .find(&lesson.id)
            .map(|l| l.weekday)
            .ok_or_else(|| StoreError::NotFound(lesson.id.clone()))?;
        if !self.days.contains_key(&lesson.weekday) {
            return Err(StoreError::NotLoaded(lesson.weekday));
        }

        let old_day = self
            .days
            .get_mut(&old_weekday)
            .ok_or(StoreError::NotLoaded(old_weekday))?;
        let pos = old_day
            .iter()
            .position(|l| l.id == lesson.id)
            .ok_or_else(|| StoreError::NotFound(lesson.id.clone()))?;
        if old_weekday == lesson.weekday {
            return Ok(std::mem::replace(&mut old_day[pos], lesson));
        }
        let old = old_day.remove(pos);
        self.days
            .get_mut(&lesson.weekday)
            .ok_or(StoreError::NotLoaded(lesson.weekday))?
            .push(lesson);
        Ok(old)
    }

    pub fn delete(&mut self, id: &str) -> Result<Lesson, StoreError> {
        for day in self.days.values_mut() {
            if let Some(pos) = day.iter().position(|l| l.id == id) {
                return Ok(day.remove(pos));
            }
        }
        Err(StoreError::NotFound(id.to_string()))
    }
}
