use crate::timetable::{StoreEvent, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Handle returned by [`EventBus::subscribe`]. Not `Clone`: the holder gives
/// it back to [`EventBus::unsubscribe`] exactly once.
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    id: SubscriptionId,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

/// Routes store events to weekday subscribers in subscription order.
#[derive(Debug, Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Weekday)>,
}

impl EventBus {
    pub fn subscribe(&mut self, weekday: Weekday) -> Subscription {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push((id, weekday));
        Subscription { id }
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(id, _)| *id != subscription.id);
        self.subscribers.len() != before
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Subscribers that should see `event`. Events that name no weekday go to
    /// everyone.
    pub fn publish(&self, event: &StoreEvent) -> Vec<SubscriptionId> {
        let target = event.weekday();
        self.subscribers
            .iter()
            .filter(|(_, weekday)| target.map_or(true, |t| t == *weekday))
            .map(|(id, _)| *id)
            .collect()
    }
}
