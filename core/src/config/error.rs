//! Error types for configuration operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading or validating the scoreboard configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("'{mode}' is not a valid scoreboard mode (expected SINGLE or WORLD)")]
    UnknownMode { mode: String },

    #[error("{name} must be a positive number of seconds, got {value}")]
    NonPositivePeriod { name: &'static str, value: i32 },

    #[error("{name} has no frames to rotate")]
    EmptySequence { name: String },

    #[error("WORLD mode requires at least one zone section")]
    NoZones,

    #[error("failed to locate the configuration file")]
    Locate(#[source] confy::ConfyError),

    #[error("failed to load configuration from {}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: confy::ConfyError,
    },

    #[error("failed to save configuration to {}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: confy::ConfyError,
    },
}
