//! Logging setup.
//!
//! The store emits `tracing` events carrying `component`, `op` and `event`
//! fields and never installs a subscriber itself. Binaries call [`init`] once;
//! tests that assert on events use [`capture`].

pub mod capture;

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Where store events go once [`init`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Pretty lines on stdout, including per-commit `debug` events.
    Development,
    /// One JSON object per event at `info` and above, which keeps subscriber
    /// failures and reentrancy rejections and drops per-commit noise.
    Production,
    /// Nothing is printed. Pair with [`capture::LogCapture`] to assert on events.
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber for `profile`. Later calls are no-ops.
///
/// `RUST_LOG` overrides the profile's default filter.
///
/// # Example
///
/// ```
/// use recall::logging::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            tracing_subscriber::fmt()
                .with_env_filter(default_filter("recall=debug"))
                .try_init()
                .ok();
        }
        Profile::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(default_filter("recall=info"))
                .try_init()
                .ok();
        }
        Profile::Test => {
            tracing_subscriber::registry().try_init().ok();
        }
    });
}

fn default_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}
