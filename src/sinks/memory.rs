use std::sync::Mutex;

use super::{EventSink, LogEvent};

#[derive(Debug, Default)]
pub(crate) struct MemoryEventSink {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryEventSink {
    pub(crate) fn events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub(crate) fn probe_outcomes(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| event.is_probe_outcome())
            .count()
    }
}

impl EventSink for MemoryEventSink {
    fn record(&self, event: LogEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
