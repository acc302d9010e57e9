//! Tracing subscriber setup.
//!
//! Logs go to stderr so `show --json` output on stdout stays machine-readable.
//! `RUST_LOG` overrides the level picked from the command line.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable lines
    Text,
    /// One JSON object per event, for CI logs
    Json,
}

static INIT_ONCE: Once = Once::new();

pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "starboard=debug"
    } else {
        "starboard=info"
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(profile: Profile, verbose: bool) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);
        let result = match profile {
            Profile::Text => builder.try_init(),
            Profile::Json => builder.json().try_init(),
        };
        if let Err(e) = result {
            eprintln!("logging already initialised: {e}");
        }
    });
}
