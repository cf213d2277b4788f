//! Scoreboard configuration
//!
//! - `provider` - confy-backed persistence of the raw model
//! - `settings` - validation into typed rotation settings

mod error;
mod provider;
mod settings;

pub use error::ConfigError;
pub use provider::ConfigProvider;
pub use settings::{FrameSource, RotationSettings, ScoreboardConfigExt, SelectionMode};
pub use scoreboard_types::{MessagesConfig, ScoreboardConfig, ZoneSection};
