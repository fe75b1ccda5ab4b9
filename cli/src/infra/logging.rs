//! `tracing` subscriber setup. Logs go to stderr so stdout stays clean.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a full `EnvFilter` directive. Overrides
/// `level` when set.
pub const LOG_ENV: &str = "REXRAY_LOG";

/// Installs the global subscriber. Calling twice is a no-op.
pub fn init(level: &str, color: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(false)
        .try_init();
}
