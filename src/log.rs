use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `PGN_LOG=warn` or
/// `PGN_LOG=pgn_stream=debug`.
pub const LOG_ENV: &str = "PGN_LOG";

const DEFAULT_FILTER: &str = "info";

/// Installs the stderr subscriber. Diagnostics never share stdout with game
/// output. Calling it twice is harmless.
pub fn init() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
