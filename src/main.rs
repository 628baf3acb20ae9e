mod app;
mod args;
mod charts;
mod config;
mod domain;
mod entry;
mod error;
mod http;
mod logger;
mod report;
mod sinks;

use error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
