mod lines;
mod summary;


pub use lines::{print_summary, result_line, summary_lines};
pub use summary::{RunStats, RunSummary, summarize};
