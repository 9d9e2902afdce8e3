//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Library and binary targets both log at `info` unless `RUST_LOG` says otherwise.
pub const DEFAULT_DIRECTIVES: &str = "hotel_utility_forecast=info,hotel_forecast=info";

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG`, defaulting to
/// `info` for the library and the binary. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
