use tracing_subscriber::{EnvFilter, FmtSubscriber};

const LOG_ENV: &str = "PINGREPORT_LOG";

/// Installs the diagnostics subscriber on stderr, keeping stdout for results.
pub fn init_logging(verbose: bool, no_color: bool) {
    let directives = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(build_filter(directives.as_deref(), verbose))
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

fn build_filter(directives: Option<&str>, verbose: bool) -> EnvFilter {
    let fallback = if verbose { "debug" } else { "info" };
    directives.map_or_else(
        || EnvFilter::new(fallback),
        |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new(fallback)),
    )
}
