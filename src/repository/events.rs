//! Events repository

use crate::models::event::LibraryEvent;

#[derive(Debug, Default, Clone)]
pub struct EventsRepository {
    events: Vec<LibraryEvent>,
}

impl EventsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping the list ordered by date; same-day events keep
    /// insertion order
    pub fn add(&mut self, event: LibraryEvent) {
        let pos = self.events.partition_point(|e| e.date <= event.date);
        self.events.insert(pos, event);
    }

    pub fn all(&self) -> &[LibraryEvent] {
        &self.events
    }

    pub fn replace_all(&mut self, mut events: Vec<LibraryEvent>) {
        events.sort_by_key(|e| e.date);
        self.events = events;
    }
}
