//! Tracing subscriber setup shared by the harness binaries

use tracing_subscriber::EnvFilter;

/// Setup logging based on verbosity level.
///
/// `RUST_LOG` takes precedence when set. Logs go to stderr so stdout only
/// carries the harness's diagnostic lines. Calling this more than once is a
/// no-op.
pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
