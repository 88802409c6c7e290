use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Environment variables consulted for a filter, highest priority first.
const FILTER_VARS: [&str; 2] = ["TALLYD_LOG", "RUST_LOG"];

pub fn init_logging(verbose: bool) {
    let configured = FILTER_VARS
        .iter()
        .find_map(|name| std::env::var(name).ok());
    let directive = filter_directive(verbose, configured);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|err| {
        eprintln!("Ignoring invalid log filter '{}': {}", directive, err);
        EnvFilter::new("info")
    });

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

fn filter_directive(verbose: bool, configured: Option<String>) -> String {
    match configured {
        Some(value) if !value.trim().is_empty() => value,
        Some(_) | None if verbose => "debug".to_owned(),
        Some(_) | None => "info".to_owned(),
    }
}
