//! Shared configuration types for the scoreboard overlays
//!
//! This crate contains the serializable configuration model that is shared
//! between the overlay core (scoreboard-core) and the host shell (scoreboard-cli).
//! Values are kept in their raw, user-editable form here; the core validates
//! them into typed rotation settings before anything is scheduled.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Mode name for a single global content sequence.
pub const MODE_SINGLE: &str = "SINGLE";
/// Mode name for per-world (partitioned) content sequences.
pub const MODE_WORLD: &str = "WORLD";

fn default_true() -> bool {
    true
}

fn default_title_update_rate() -> i32 {
    10
}

fn default_frame_update_rate() -> i32 {
    20
}

fn default_mode() -> String {
    MODE_SINGLE.to_string()
}

fn default_titles() -> Vec<String> {
    vec![
        "<gradient:aqua:green>Scoreboard".to_string(),
        "<gradient:green:aqua>Scoreboard".to_string(),
    ]
}

fn default_content() -> Vec<String> {
    vec![String::new(), String::new()]
}

fn default_zones() -> Vec<ZoneSection> {
    vec![ZoneSection::default()]
}

// ─────────────────────────────────────────────────────────────────────────────
// Scoreboard Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Content configured for one world/zone when running in `WORLD` mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ZoneSection {
    /// Name of the zone this section applies to. Acts as the section identifier.
    pub zone: String,
    /// Line frames rotated for clients standing in this zone.
    #[serde(default = "default_content")]
    pub content: Vec<String>,
}

impl Default for ZoneSection {
    fn default() -> Self {
        Self {
            zone: "world".to_string(),
            content: default_content(),
        }
    }
}

/// Root scoreboard configuration.
///
/// Periods are stored signed so that zero and negative values written by
/// hand survive deserialization and can be reported as configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScoreboardConfig {
    /// Rotate the title of every overlay through `titles`.
    /// When disabled, only the first title is shown.
    #[serde(default = "default_true")]
    pub use_animated_title: bool,

    /// Seconds between title frames.
    #[serde(default = "default_title_update_rate")]
    pub title_update_rate: i32,

    /// Seconds between line frames.
    #[serde(default = "default_frame_update_rate")]
    pub frame_update_rate: i32,

    /// Line slot the line rotator writes to.
    #[serde(default)]
    pub rotating_line: usize,

    /// `SINGLE` or `WORLD`.
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Title frames. Global for every mode.
    #[serde(default = "default_titles")]
    pub titles: Vec<String>,

    /// Line frames for `SINGLE` mode.
    #[serde(default = "default_content")]
    pub content: Vec<String>,

    /// Per-zone line frames for `WORLD` mode.
    #[serde(default = "default_zones")]
    pub zones: Vec<ZoneSection>,

    #[serde(default)]
    pub messages: MessagesConfig,
}

impl Default for ScoreboardConfig {
    fn default() -> Self {
        Self {
            use_animated_title: true,
            title_update_rate: default_title_update_rate(),
            frame_update_rate: default_frame_update_rate(),
            rotating_line: 0,
            mode: default_mode(),
            titles: default_titles(),
            content: default_content(),
            zones: default_zones(),
            messages: MessagesConfig::default(),
        }
    }
}

impl ScoreboardConfig {
    /// Find the configured section for a zone name.
    pub fn zone(&self, name: &str) -> Option<&ZoneSection> {
        self.zones.iter().find(|section| section.zone == name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// Feedback shown to clients and operators by the host shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MessagesConfig {
    pub scoreboard_enabled: String,
    pub scoreboard_disabled: String,
    pub reload_success: String,
    pub reload_failed: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            scoreboard_enabled: "Scoreboard has been enabled!".to_string(),
            scoreboard_disabled: "Scoreboard has been disabled!".to_string(),
            reload_success: "The configuration and scoreboard components have been reloaded!"
                .to_string(),
            reload_failed: "Failed to reload the scoreboard components. Check the update rates \
                            and the scoreboard mode."
                .to_string(),
        }
    }
}
