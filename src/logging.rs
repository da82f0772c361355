//! Diagnostic logging on stderr via `tracing`
//!
//! stdout is reserved for the success line and fatal errors, so every
//! progress or warning event goes to stderr.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Environment variable holding a `tracing` filter directive
pub const LOG_ENV: &str = "MOSAIC_README_LOG";

/// Install the global subscriber. Safe to call more than once; later calls are no-ops.
pub fn init(verbose: bool) {
    let _ = Registry::default()
        .with(build_env_filter(verbose))
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();
}

/// `MOSAIC_README_LOG` wins; otherwise `debug` when verbose, `warn` by default
fn build_env_filter(verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return filter;
    }

    let level = if verbose { "debug" } else { "warn" };
    EnvFilter::new(format!("warn,mosaic_readme={}", level))
}
