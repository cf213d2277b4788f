//! Repository of active overlays
//!
//! The only place overlay instances are created, replaced and removed.
//! Lifecycle callers and both rotation workers share one repository, so the
//! map sits behind a read/write lock and iteration always works on a
//! copied snapshot.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use hashbrown::HashMap;
use tracing::{debug, warn};

use super::OverlayInstance;
use crate::client::{ClientId, Visibility};
use crate::render::RendererHandle;

/// Maps each connected client to its single overlay.
#[derive(Debug, Default)]
pub struct OverlayRepository {
    overlays: RwLock<HashMap<ClientId, Arc<OverlayInstance>>>,
}

impl OverlayRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<ClientId, Arc<OverlayInstance>>> {
        self.overlays.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ClientId, Arc<OverlayInstance>>> {
        self.overlays.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up the overlay of `id`.
    pub fn find(&self, id: &ClientId) -> Option<Arc<OverlayInstance>> {
        self.read().get(id).cloned()
    }

    /// Snapshot of every registered overlay.
    ///
    /// Later inserts and removals do not affect the returned collection.
    pub fn all(&self) -> Vec<Arc<OverlayInstance>> {
        self.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Store a new visible overlay for `id`.
    ///
    /// Registering the same client twice is an operator error: the previous
    /// renderer handle is released before the entry is replaced.
    pub fn register(&self, id: ClientId, renderer: Box<dyn RendererHandle>) -> Arc<OverlayInstance> {
        let instance = Arc::new(OverlayInstance::new(id.clone(), renderer));
        let mut overlays = self.write();
        if let Some(previous) = overlays.get(&id) {
            warn!(client = %id, "Overlay registered twice, releasing the previous renderer");
            previous.release();
        }
        overlays.insert(id, Arc::clone(&instance));
        instance
    }

    /// Update the visibility of `id` in place, attaching or detaching the
    /// client on the renderer. Returns `None` if there is no overlay.
    pub fn set_visibility(&self, id: &ClientId, visibility: Visibility) -> Option<Visibility> {
        let instance = self.find(id)?;
        instance.set_visibility(visibility)
    }

    /// Remove the overlay of `id` and release its renderer.
    ///
    /// Returns `false` if there was no overlay, or its renderer had already
    /// been released or closed.
    pub fn unregister(&self, id: &ClientId) -> bool {
        let Some(instance) = self.write().remove(id) else {
            return false;
        };
        instance.release()
    }

    /// Release every renderer and empty the repository.
    /// Returns how many renderers were actually released.
    pub fn clear(&self) -> usize {
        let drained: Vec<_> = self.write().drain().map(|(_, instance)| instance).collect();
        let total = drained.len();
        let released = drained.iter().filter(|instance| instance.release()).count();
        debug!(total, released, "Overlay repository cleared");
        released
    }
}
