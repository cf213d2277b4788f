//! Overlay lifecycle
//!
//! Per client:
//!
//! ```text
//!   (absent) ──create──▶ VISIBLE ──toggle──▶ HIDDEN ──toggle──▶ VISIBLE
//!   VISIBLE / HIDDEN ──delete──▶ (absent)
//! ```
//!
//! Hooks registered on the [`ScoreboardManager`] are consulted before a
//! create or toggle and may veto it; a veto leaves no trace.

mod manager;


pub use crate::client::ZoneLookup;
pub use manager::ScoreboardManager;

use crate::client::{ClientId, Visibility};

/// Answer of a hook to a pending lifecycle change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookDecision {
    #[default]
    Allow,
    Deny,
}

/// Listener notified before overlays change.
///
/// Called synchronously on the thread performing the operation, before any
/// state is touched. Hooks must not call back into the manager.
pub trait LifecycleHook: Send + Sync {
    fn before_create(&self, _client: &ClientId) -> HookDecision {
        HookDecision::Allow
    }

    /// `current` is the visibility before the toggle.
    fn before_toggle(&self, _client: &ClientId, _current: Visibility) -> HookDecision {
        HookDecision::Allow
    }

    /// The overlay is about to be deleted. Cannot be vetoed.
    fn before_close(&self, _client: &ClientId) {}
}

/// Result of [`ScoreboardManager::create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    /// A hook denied the creation
    Cancelled,
    /// The client's zone has no configured content
    NoPartition,
    /// The manager is not loaded
    Inert,
}

impl CreateOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, CreateOutcome::Created)
    }
}

/// Result of [`ScoreboardManager::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// No overlay exists, or a hook denied the toggle
    NoOverlay,
    NowVisible,
    NowHidden,
}

impl From<Visibility> for ToggleOutcome {
    fn from(visibility: Visibility) -> Self {
        match visibility {
            Visibility::Visible => ToggleOutcome::NowVisible,
            Visibility::Hidden => ToggleOutcome::NowHidden,
        }
    }
}
