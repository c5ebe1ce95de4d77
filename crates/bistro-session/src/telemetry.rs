//! # Telemetry
//!
//! Installs the tracing subscriber for binaries embedding a session.
//!
//! `RUST_LOG` wins when set; otherwise the session logs at info and the
//! bistro crates at debug, which includes every cart mutation.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,bistro_core=debug,bistro_session=debug";

/// Initializes the tracing subscriber for logging.
///
/// A host that already installed its own subscriber keeps it; this call then
/// does nothing.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
