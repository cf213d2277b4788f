//! Rendering service seam
//!
//! The core never paints text or speaks the host's packet protocol. It drives
//! an external rendering library through three traits:
//!
//! - [`RenderHost`] - the host platform; hands out a rendering session on load
//! - [`RenderingService`] - an open session; creates one handle per client
//! - [`RendererHandle`] - the host-side channel that paints one client's overlay
//!
//! Handles are owned 1:1 by an [`OverlayInstance`](crate::overlay::OverlayInstance),
//! which guarantees `release` is called exactly once.

use std::sync::Arc;

use thiserror::Error;

use crate::client::{ClientId, Frame};

/// Errors while acquiring a rendering session
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no compatible packet adapter is available for this host")]
    NoPacketAdapter,

    #[error("rendering session could not be opened: {reason}")]
    Session { reason: String },
}

/// Host-side channel used to push overlay updates to a single client.
pub trait RendererHandle: Send + Sync {
    /// Start showing the overlay to `client`.
    fn attach(&self, client: &ClientId);

    /// Stop showing the overlay to `client` without releasing the handle.
    fn detach(&self, client: &ClientId);

    /// Replace the text of one line.
    fn set_line(&self, index: usize, text: &Frame);

    /// Replace the overlay title.
    fn set_title(&self, text: &Frame);

    /// Whether the underlying resource was already closed by the host.
    fn is_closed(&self) -> bool;

    /// Free the host-side resources behind this handle.
    fn release(&self);
}

/// An open session with the rendering library.
pub trait RenderingService: Send + Sync {
    /// Create a fresh, unattached handle for `client`.
    fn create_handle(&self, client: &ClientId) -> Box<dyn RendererHandle>;

    /// Close the session. Called once during manager shutdown.
    fn close(&self);
}

/// The host platform the scoreboard is loaded into.
pub trait RenderHost {
    /// Acquire a rendering session, failing fast when the host has no
    /// compatible adapter.
    fn open_rendering_service(&self) -> Result<Arc<dyn RenderingService>, RenderError>;
}
