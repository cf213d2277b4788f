//! Validated rotation settings
//!
//! Raw [`ScoreboardConfig`] values are checked once, at load or reload time,
//! and turned into typed settings. The mode string never travels further
//! than this module.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use hashbrown::HashMap;
use scoreboard_types::{MODE_SINGLE, MODE_WORLD, ScoreboardConfig};

use super::ConfigError;
use crate::client::{Frame, frames};

// ─────────────────────────────────────────────────────────────────────────────
// Selection Mode
// ─────────────────────────────────────────────────────────────────────────────

/// How line content is chosen for a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionMode {
    /// One global sequence for every overlay
    Single,
    /// A sequence per zone, looked up from the client's current zone
    Partitioned,
}

impl FromStr for SelectionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            MODE_SINGLE => Ok(SelectionMode::Single),
            MODE_WORLD => Ok(SelectionMode::Partitioned),
            other => Err(ConfigError::UnknownMode {
                mode: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::Single => f.write_str(MODE_SINGLE),
            SelectionMode::Partitioned => f.write_str(MODE_WORLD),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Frame Source
// ─────────────────────────────────────────────────────────────────────────────

/// Where a rotation task takes its frames from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSource {
    Single(Vec<Frame>),
    /// Zone name → frames. Clients in an unlisted zone get nothing.
    Partitioned(HashMap<String, Vec<Frame>>),
}

impl FrameSource {
    pub fn mode(&self) -> SelectionMode {
        match self {
            FrameSource::Single(_) => SelectionMode::Single,
            FrameSource::Partitioned(_) => SelectionMode::Partitioned,
        }
    }

    /// The sequence to rotate for a client standing in `zone`.
    pub fn sequence_for(&self, zone: Option<&str>) -> Option<&[Frame]> {
        match self {
            FrameSource::Single(frames) => Some(frames.as_slice()),
            FrameSource::Partitioned(zones) => zone
                .and_then(|zone| zones.get(zone))
                .map(Vec::as_slice),
        }
    }

    /// Whether a zone has content configured. Always true in single mode.
    pub fn accepts(&self, zone: Option<&str>) -> bool {
        self.sequence_for(zone).is_some()
    }

    /// True when there is nothing at all to rotate.
    pub fn is_empty(&self) -> bool {
        match self {
            FrameSource::Single(frames) => frames.is_empty(),
            FrameSource::Partitioned(zones) => {
                zones.is_empty() || zones.values().any(|frames| frames.is_empty())
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rotation Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Everything the lifecycle manager and the rotation tasks need from the
/// configuration, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationSettings {
    pub mode: SelectionMode,
    /// `None` when the configured value was not positive
    pub line_period: Option<Duration>,
    pub title_period: Option<Duration>,
    /// Line index the line rotator writes to
    pub line_slot: usize,
    pub lines: FrameSource,
    pub titles: Vec<Frame>,
    pub animated_title: bool,
}

impl RotationSettings {
    /// Title applied once on creation when title rotation is disabled.
    pub fn static_title(&self) -> Option<&Frame> {
        if self.animated_title {
            None
        } else {
            self.titles.first()
        }
    }
}

fn period(value: i32) -> Option<Duration> {
    u64::try_from(value)
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

/// Validation for the raw configuration model
pub trait ScoreboardConfigExt {
    /// Resolve the mode string.
    fn selection_mode(&self) -> Result<SelectionMode, ConfigError>;

    /// Reject zero or negative update rates.
    fn check_periods(&self) -> Result<(), ConfigError>;

    /// Build rotation settings. Non-positive periods are left unset so the
    /// caller can apply its default.
    fn rotation_settings(&self) -> Result<RotationSettings, ConfigError>;
}

impl ScoreboardConfigExt for ScoreboardConfig {
    fn selection_mode(&self) -> Result<SelectionMode, ConfigError> {
        self.mode.parse()
    }

    fn check_periods(&self) -> Result<(), ConfigError> {
        if self.frame_update_rate <= 0 {
            return Err(ConfigError::NonPositivePeriod {
                name: "frame-update-rate",
                value: self.frame_update_rate,
            });
        }
        if self.title_update_rate <= 0 {
            return Err(ConfigError::NonPositivePeriod {
                name: "title-update-rate",
                value: self.title_update_rate,
            });
        }
        Ok(())
    }

    fn rotation_settings(&self) -> Result<RotationSettings, ConfigError> {
        let mode = self.selection_mode()?;

        let lines = match mode {
            SelectionMode::Single => {
                if self.content.is_empty() {
                    return Err(ConfigError::EmptySequence {
                        name: "content".to_string(),
                    });
                }
                FrameSource::Single(frames(&self.content))
            }
            SelectionMode::Partitioned => {
                if self.zones.is_empty() {
                    return Err(ConfigError::NoZones);
                }
                let mut zones = HashMap::with_capacity(self.zones.len());
                for section in &self.zones {
                    if section.content.is_empty() {
                        return Err(ConfigError::EmptySequence {
                            name: format!("zone '{}'", section.zone),
                        });
                    }
                    // First section wins for duplicated zone names
                    zones
                        .entry(section.zone.clone())
                        .or_insert_with(|| frames(&section.content));
                }
                FrameSource::Partitioned(zones)
            }
        };

        if self.use_animated_title && self.titles.is_empty() {
            return Err(ConfigError::EmptySequence {
                name: "titles".to_string(),
            });
        }

        Ok(RotationSettings {
            mode,
            line_period: period(self.frame_update_rate),
            title_period: period(self.title_update_rate),
            line_slot: self.rotating_line,
            lines,
            titles: frames(&self.titles),
            animated_title: self.use_animated_title,
        })
    }
}
