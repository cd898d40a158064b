//! Telemetry module providing tracing subscriber initialization.
//!
//! Libraries in this workspace only emit `tracing` events; binaries install
//! `init_dev_subscriber_with_env_filter()` at startup (stderr, filtered by
//! `RUST_LOG`).
//!
//! # Usage
//!
//! ```no_run
//! use sedb_core::telemetry;
//!
//! fn main() {
//!     telemetry::init_dev_subscriber_with_env_filter();
//!     tracing::info!("Application started");
//! }
//! ```

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Default filter directive when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Initialize a stderr subscriber that respects the `RUST_LOG` environment variable.
///
/// If `RUST_LOG` is not set (or does not parse), falls back to [`DEFAULT_FILTER`].
///
/// ```no_run
/// use sedb_core::telemetry;
///
/// // RUST_LOG=sedb_db=debug,info shows store lifecycle events
/// telemetry::init_dev_subscriber_with_env_filter();
/// ```
///
/// # Panics
/// Panics if a global subscriber has already been set.
pub fn init_dev_subscriber_with_env_filter() {
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Build the filter used by [`init_dev_subscriber_with_env_filter`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;

    // set_global_default can only be called once per process, so only the
    // filter construction is exercised here.
    #[test]
    fn test_env_filter_builds() {
        let filter = env_filter();
        assert!(!filter.to_string().is_empty());
    }

    #[test]
    fn test_default_filter_parses() {
        let filter = EnvFilter::new(DEFAULT_FILTER);
        assert_eq!(filter.to_string(), "info");
    }
}
