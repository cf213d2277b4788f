//! Client identity and pre-rendered content frames

use std::fmt;
use std::sync::Arc;

/// Stable identifier of a connected client (e.g. a session UUID).
///
/// Cheap to clone; immutable for the lifetime of the client's overlay.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(Arc<str>);

impl ClientId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ClientId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// One unit of already-rendered overlay content (a line or a title).
///
/// Markup is resolved before text reaches the core, so a frame is pushed to
/// the renderer verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Frame(Arc<str>);

impl Frame {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Frame {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Frame {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Convert raw configured strings into frames.
pub fn frames<S: AsRef<str>>(texts: &[S]) -> Vec<Frame> {
    texts.iter().map(|t| Frame::new(t.as_ref())).collect()
}

/// Whether an overlay is currently shown to its client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Initial state of every new overlay
    #[default]
    Visible,
    Hidden,
}

impl Visibility {
    pub fn toggled(self) -> Self {
        match self {
            Visibility::Visible => Visibility::Hidden,
            Visibility::Hidden => Visibility::Visible,
        }
    }

    pub fn is_visible(self) -> bool {
        matches!(self, Visibility::Visible)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Visible => f.write_str("visible"),
            Visibility::Hidden => f.write_str("hidden"),
        }
    }
}

/// Resolves the partition key (current zone/world) of a client.
///
/// Implemented by the host integration; returning `None` means the client
/// is not in any known zone.
pub trait ZoneLookup: Send + Sync {
    fn zone_of(&self, client: &ClientId) -> Option<String>;
}

impl<F> ZoneLookup for F
where
    F: Fn(&ClientId) -> Option<String> + Send + Sync,
{
    fn zone_of(&self, client: &ClientId) -> Option<String> {
        self(client)
    }
}
