//! Logging setup for errata
//!
//! Error classification reports through the `tracing` facade; this crate
//! builds the subscriber that turns those events into log lines.

#![allow(clippy::must_use_candidate)]

#[cfg(feature = "testing")]
pub mod testing;

use errata_config::{LogConfig, LogFormat};
use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt};

/// Build a subscriber for the given configuration without installing it
///
/// An invalid filter directive falls back to `info`.
pub fn subscriber(config: &LogConfig) -> Box<dyn Subscriber + Send + Sync> {
    let registry = tracing_subscriber::registry().with(build_filter(&config.filter));

    match config.format {
        LogFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);

            Box::new(registry.with(fmt_layer))
        }
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(false)
                .flatten_event(true);

            Box::new(registry.with(fmt_layer))
        }
    }
}

/// Install the global subscriber
///
/// # Errors
///
/// Returns an error if a global subscriber has already been set
pub fn init(config: &LogConfig) -> anyhow::Result<()> {
    tracing::subscriber::set_global_default(subscriber(config))
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

fn build_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
}
