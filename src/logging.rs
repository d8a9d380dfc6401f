//! Logger setup for the command line host.
//!
//! The library only emits through the `log` facade; this installs an
//! `env_logger` backend. `RUST_LOG` overrides the default `info` filter.

use env_logger::{Builder, Env};

pub fn init() {
    let env = Env::default().default_filter_or("info");
    // A logger may already be installed (e.g. by a test harness)
    let _ = Builder::from_env(env)
        .format_timestamp_millis()
        .format_target(false)
        .try_init();
}
