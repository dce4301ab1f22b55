use crate::bus::{EventBus, Subscription};
use crate::config::TimetableConfig;
use crate::store::LessonStore;
use crate::timetable::{ScheduleView, StoreEvent};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct OpenView {
    pub view: ScheduleView,
    pub subscription: Subscription,
}

pub struct AppState {
    pub config: TimetableConfig,
    pub store: LessonStore,
    pub bus: EventBus,
    pub views: BTreeMap<String, OpenView>,
}

impl AppState {
    pub fn new(config: TimetableConfig) -> Self {
        AppState {
            config,
            store: LessonStore::default(),
            bus: EventBus::default(),
            views: BTreeMap::new(),
        }
    }

    /// Delivers `event` to every subscribed view. Returns how many views
    /// changed.
    pub fn dispatch(&mut self, event: StoreEvent) -> usize {
        let targets = self.bus.publish(&event);
        tracing::debug!(
            event = event.name(),
            weekday = ?event.weekday(),
            subscribers = targets.len(),
            "dispatch"
        );

        if let StoreEvent::MutationSucceeded {
            record: Some(lesson),
            ..
        } = &event
        {
            tracing::debug!(lesson = %lesson.id, hall = %lesson.hall, "changed record");
        }

        let grid = self.config.grid();
        let relayout = matches!(
            event,
            StoreEvent::FetchSucceeded { .. } | StoreEvent::MutationSucceeded { .. }
        );
        let mut changed = 0;
        for sub_id in targets {
            let Some((view_id, open)) = self
                .views
                .iter_mut()
                .find(|(_, v)| v.subscription.id() == sub_id)
            else {
                continue;
            };
            let lessons = self.store.day(open.view.weekday());
            match open.view.handle(&event, lessons, &grid) {
                Ok(true) => {
                    changed += 1;
                    if relayout {
                        log_dropped(view_id, &open.view);
                    }
                }
                Ok(false) => {}
                Err(e) => tracing::error!(view = %view_id, error = %e, "rebuild failed"),
            }
        }
        changed
    }

    /// Re-lays out every Ready view against the current config.
    pub fn refresh_views(&mut self) {
        let grid = self.config.grid();
        for (view_id, open) in self.views.iter_mut() {
            let lessons = self.store.day(open.view.weekday());
            match open.view.refresh(lessons, &grid) {
                Ok(()) => log_dropped(view_id, &open.view),
                Err(e) => tracing::error!(view = %view_id, error = %e, "rebuild failed"),
            }
        }
    }
}

pub fn log_dropped(view_id: &str, view: &ScheduleView) {
    let Some(schedule) = view.schedule() else {
        return;
    };
    for (placement, reason) in schedule.dropped() {
        tracing::warn!(
            view = %view_id,
            weekday = %schedule.weekday,
            lesson = %placement.lesson_id,
            hall = %placement.hall,
            ?reason,
            "lesson left out of timetable"
        );
    }
}
