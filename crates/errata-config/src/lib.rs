#![allow(clippy::must_use_candidate)]

pub mod errors;
mod loader;
pub mod log;
pub mod negotiation;

use serde::Deserialize;

pub use errors::*;
pub use log::*;
pub use negotiation::*;

/// Top-level errata configuration
///
/// Usually embedded as a table in the host application's own config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// How handler errors are turned into responses
    #[serde(default)]
    pub errors: ErrorsConfig,
    /// JSON content-type normalization for successful responses
    #[serde(default)]
    pub negotiation: NegotiationConfig,
    /// Log output
    #[serde(default)]
    pub log: LogConfig,
}
