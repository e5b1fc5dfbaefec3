//! Tracing setup keyed off CLI verbosity and config.

use tracing_subscriber::EnvFilter;

/// Map `-q`/`-v` to a default filter. An explicit config filter or
/// `WIKIGIT_LOG` wins over the derived default.
pub fn init(verbosity: u8, quiet: bool, filter: Option<&str>) {
    let default = if quiet {
        "error"
    } else {
        match verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = match filter {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_env("WIKIGIT_LOG").unwrap_or_else(|_| EnvFilter::new(default)),
    };
    // try_init: tests may initialize more than once.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
