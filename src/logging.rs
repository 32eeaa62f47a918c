//! Diagnostic logging for the binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the program embedding it. `cliagent` logs to stderr so agent output
//! on stdout stays clean.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "cliagent=debug,warn"
    } else {
        "warn"
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default level.
/// A second call is a no-op.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose),
        )
        .try_init();
}
