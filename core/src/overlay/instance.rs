//! Per-client overlay record

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::client::{ClientId, Frame, Visibility};
use crate::render::RendererHandle;

/// Mutable part of an overlay, guarded by the per-entry lock.
#[derive(Debug)]
struct EntryState {
    visibility: Visibility,
    released: bool,
    /// Title to apply the next time the overlay is shown
    pending_title: Option<Frame>,
}

/// A client's overlay: identity, renderer handle and visibility.
///
/// Every renderer call goes through the entry lock together with the
/// `released` flag, so a rotation tick holding a stale snapshot can never
/// push a frame into a handle that has already been released.
pub struct OverlayInstance {
    id: ClientId,
    renderer: Box<dyn RendererHandle>,
    state: Mutex<EntryState>,
}

impl fmt::Debug for OverlayInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("OverlayInstance")
            .field("id", &self.id)
            .field("visibility", &state.visibility)
            .field("released", &state.released)
            .finish()
    }
}

impl OverlayInstance {
    pub(crate) fn new(id: ClientId, renderer: Box<dyn RendererHandle>) -> Self {
        Self {
            id,
            renderer,
            state: Mutex::new(EntryState {
                visibility: Visibility::Visible,
                released: false,
                pending_title: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, EntryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> &ClientId {
        &self.id
    }

    pub fn visibility(&self) -> Visibility {
        self.state().visibility
    }

    /// Whether the renderer handle has been released.
    pub fn is_released(&self) -> bool {
        self.state().released
    }

    /// Run `push` against the renderer only while the overlay is visible
    /// and not released. Returns whether the push happened.
    pub(crate) fn push_if_visible(&self, push: impl FnOnce(&dyn RendererHandle)) -> bool {
        let state = self.state();
        if state.released || state.visibility == Visibility::Hidden {
            return false;
        }
        push(self.renderer.as_ref());
        true
    }

    /// Move to `next`, attaching or detaching the client when the state
    /// actually changes. Returns `None` once released.
    pub(crate) fn set_visibility(&self, next: Visibility) -> Option<Visibility> {
        let mut state = self.state();
        if state.released {
            return None;
        }
        self.transition(&mut state, next);
        Some(next)
    }

    /// Flip the visibility, but only if it is still `expected`.
    ///
    /// Returns the new visibility, or `None` when the overlay was released
    /// or someone else changed it first.
    pub(crate) fn toggle_from(&self, expected: Visibility) -> Option<Visibility> {
        let mut state = self.state();
        if state.released || state.visibility != expected {
            return None;
        }
        let next = expected.toggled();
        self.transition(&mut state, next);
        Some(next)
    }

    /// Replace the title. A hidden overlay gets it when shown again.
    pub(crate) fn retitle(&self, title: &Frame) -> bool {
        let mut state = self.state();
        if state.released {
            return false;
        }
        match state.visibility {
            Visibility::Visible => {
                state.pending_title = None;
                self.renderer.set_title(title);
            }
            Visibility::Hidden => state.pending_title = Some(title.clone()),
        }
        true
    }

    fn transition(&self, state: &mut EntryState, next: Visibility) {
        if state.visibility == next {
            return;
        }
        match next {
            Visibility::Visible => {
                if let Some(title) = state.pending_title.take() {
                    self.renderer.set_title(&title);
                }
                self.renderer.attach(&self.id);
            }
            Visibility::Hidden => self.renderer.detach(&self.id),
        }
        state.visibility = next;
    }

    /// Release the renderer handle. Only the first call has an effect.
    ///
    /// Returns `false` if the handle was already released here, or was
    /// closed by the host before we got to it.
    pub(crate) fn release(&self) -> bool {
        let mut state = self.state();
        if state.released {
            return false;
        }
        state.released = true;
        if self.renderer.is_closed() {
            return false;
        }
        if state.visibility == Visibility::Visible {
            self.renderer.detach(&self.id);
        }
        self.renderer.release();
        true
    }
}
