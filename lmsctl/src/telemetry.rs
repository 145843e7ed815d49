//! Telemetry initialization (tracing subscriber with env-filtered console output).
//!
//! Filtering is controlled with the standard `RUST_LOG` environment variable and
//! defaults to `info`. Per-request spans come from `tower_http`'s `TraceLayer`,
//! which is attached in [`crate::build_router`].

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the global tracing subscriber.
///
/// Safe to call once per process; returns an error if a subscriber is already set.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(())
}
