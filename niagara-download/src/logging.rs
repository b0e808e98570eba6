use is_terminal::IsTerminal;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global `tracing` subscriber.
///
/// Logs go to stderr so they stay out of the progress line on stdout.
/// `RUST_LOG` overrides `default_directive`. Returns `false` when a
/// subscriber was already installed, in which case nothing changes.
pub fn init_logging(default_directive: &str) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
