//! Logging setup shared by the binaries

use tracing_subscriber::{EnvFilter, fmt};

/// Initialize logging with a default filter.
///
/// Use `RUST_LOG` to override. Default is `info` for this crate and `warn`
/// for everything else; `quiet` drops this crate to `warn` as well, which
/// still reports every failed invocation.
pub fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "warn,antshots=info,showcase=info,report=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
