//! Consumers of run output: the per-run event log and the console.
mod console;
mod event_log;
mod events;
mod format;
#[cfg(test)]
pub(crate) mod memory;

pub use console::{ConsoleObserver, ResultObserver};
pub use event_log::EventLog;
pub use events::{EventRecord, EventSink, LogEvent};
