pub mod client;
pub mod config;
pub mod lifecycle;
pub mod overlay;
pub mod render;
pub mod rotation;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenience
pub use client::{ClientId, Frame, Visibility, ZoneLookup};
pub use config::{ConfigError, ConfigProvider, RotationSettings, ScoreboardConfigExt, SelectionMode};
pub use lifecycle::{CreateOutcome, HookDecision, LifecycleHook, ScoreboardManager, ToggleOutcome};
pub use overlay::{OverlayInstance, OverlayRepository};
pub use render::{RenderError, RenderHost, RendererHandle, RenderingService};
pub use rotation::{DEFAULT_PERIOD, SHUTDOWN_GRACE, ShutdownResult};
pub use scoreboard_types::{MessagesConfig, ScoreboardConfig, ZoneSection};
