use std::collections::VecDeque;

use crate::data::types::FlowEvent;

/// Received events, newest first. Entries are never removed or reordered.
#[derive(Debug, Default)]
pub struct EventLog {
    events: VecDeque<FlowEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, event: FlowEvent) {
        self.events.push_front(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlowEvent> {
        self.events.iter()
    }
}
