//! Logging setup
//!
//! Filter precedence: `RUST_LOG`, then `--verbose`, then the configured
//! `log_level`. Output goes to stderr so it never mixes with command output.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber
///
/// Safe to call more than once; later calls are ignored.
pub fn init(verbose: bool, config_level: &str) {
    let _ = fmt()
        .with_env_filter(filter(verbose, config_level))
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Verbose test logging, routed through the test harness
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

fn filter(verbose: bool, config_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    if verbose {
        return EnvFilter::new("plantree=debug");
    }
    EnvFilter::try_new(config_level).unwrap_or_else(|_| EnvFilter::new("warn"))
}
