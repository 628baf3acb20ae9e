use crate::domain::ProbeResult;
use crate::report::result_line;

/// Notified once per probe result, in arrival order.
pub trait ResultObserver: Send + Sync {
    fn on_result(&self, result: &ProbeResult);
}

/// Prints one line per result to stdout as results arrive.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

impl ResultObserver for ConsoleObserver {
    fn on_result(&self, result: &ProbeResult) {
        println!("{}", result_line(result));
    }
}
