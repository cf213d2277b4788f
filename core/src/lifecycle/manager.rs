//! Scoreboard manager
//!
//! Owns the repository, the rendering session and the rotation tasks, and
//! exposes the operations the host wires to its events.
//!
//! Lock order is supervisor, then loaded state. Hooks are always called with
//! no lock held.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};

use scoreboard_types::ScoreboardConfig;
use tracing::{debug, error, info, warn};

use super::{CreateOutcome, HookDecision, LifecycleHook, ToggleOutcome};
use crate::client::{ClientId, Visibility, ZoneLookup};
use crate::config::{FrameSource, RotationSettings, ScoreboardConfigExt, SelectionMode};
use crate::overlay::{OverlayInstance, OverlayRepository};
use crate::render::{RenderHost, RenderingService};
use crate::rotation::{
    DEFAULT_PERIOD, RotationTarget, RotationTask, ShutdownResult, TaskSupervisor,
};

/// Session and settings of a loaded manager.
struct Loaded {
    session: Arc<dyn RenderingService>,
    settings: RotationSettings,
}

/// Entry point of the scoreboard subsystem.
///
/// Constructed once by the host and shared by `Arc`. Until [`load`] succeeds
/// (and after [`shutdown`]) it is inert: creates report
/// [`CreateOutcome::Inert`] and toggles/deletes find no overlay.
///
/// [`load`]: ScoreboardManager::load
/// [`shutdown`]: ScoreboardManager::shutdown
pub struct ScoreboardManager {
    repository: Arc<OverlayRepository>,
    zones: Arc<dyn ZoneLookup>,
    hooks: RwLock<Vec<Arc<dyn LifecycleHook>>>,
    loaded: RwLock<Option<Loaded>>,
    supervisor: Mutex<TaskSupervisor>,
}

impl ScoreboardManager {
    pub fn new(zones: Arc<dyn ZoneLookup>) -> Self {
        Self {
            repository: Arc::new(OverlayRepository::new()),
            zones,
            hooks: RwLock::new(Vec::new()),
            loaded: RwLock::new(None),
            supervisor: Mutex::new(TaskSupervisor::new()),
        }
    }

    pub fn add_hook(&self, hook: Arc<dyn LifecycleHook>) {
        self.hooks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(hook);
    }

    pub fn repository(&self) -> &Arc<OverlayRepository> {
        &self.repository
    }

    pub fn find(&self, client: &ClientId) -> Option<Arc<OverlayInstance>> {
        self.repository.find(client)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded().is_some()
    }

    /// Settings currently in effect, if loaded.
    pub fn settings(&self) -> Option<RotationSettings> {
        self.loaded().as_ref().map(|loaded| loaded.settings.clone())
    }

    /// Targets of the rotation tasks that are currently running.
    pub fn running_tasks(&self) -> Vec<RotationTarget> {
        self.supervisor()
            .tasks()
            .iter()
            .filter(|task| task.is_running())
            .map(|task| task.target())
            .collect()
    }

    fn loaded(&self) -> RwLockReadGuard<'_, Option<Loaded>> {
        self.loaded.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn supervisor(&self) -> MutexGuard<'_, TaskSupervisor> {
        self.supervisor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn hooks(&self) -> Vec<Arc<dyn LifecycleHook>> {
        self.hooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Load / Reload / Shutdown
    // ─────────────────────────────────────────────────────────────────────────

    /// Open the rendering session and start the rotation tasks.
    ///
    /// Returns false (leaving the manager inert) when the configuration is
    /// invalid, the host has no rendering adapter, or a task cannot start.
    pub fn load(&self, host: &dyn RenderHost, config: &ScoreboardConfig) -> bool {
        let mut supervisor = self.supervisor();
        if self.is_loaded() {
            warn!("Scoreboard is already loaded");
            return false;
        }

        let settings = match config.rotation_settings() {
            Ok(settings) => settings,
            Err(err) => {
                error!(error = %err, "Invalid scoreboard configuration");
                return false;
            }
        };

        let session = match host.open_rendering_service() {
            Ok(session) => session,
            Err(err) => {
                error!(error = %err, "Scoreboard disabled: rendering service unavailable");
                return false;
            }
        };

        if let Err(failed) = self.start_tasks(&mut supervisor, &settings) {
            error!(failed, "Scoreboard rotation tasks failed to start");
            session.close();
            return false;
        }

        info!(
            mode = %settings.mode,
            animated_title = settings.animated_title,
            "Scoreboard loaded"
        );
        *self.loaded.write().unwrap_or_else(PoisonError::into_inner) =
            Some(Loaded { session, settings });
        true
    }

    /// Apply a new configuration: validate, restart the rotation tasks with
    /// the new periods and content, then swap the settings.
    ///
    /// Invalid configurations are rejected and the running setup is kept.
    /// If the new tasks fail to start, the previous tasks are started again
    /// and the previous settings stay in effect. Existing overlays stay open
    /// and pick up a changed static title.
    pub fn reload(&self, config: &ScoreboardConfig) -> bool {
        let settings = match config
            .check_periods()
            .and_then(|()| config.rotation_settings())
        {
            Ok(settings) => settings,
            Err(err) => {
                error!(error = %err, "Scoreboard reload rejected");
                return false;
            }
        };

        let mut supervisor = self.supervisor();
        let Some(previous) = self.settings() else {
            warn!("Scoreboard reload requested while not loaded");
            return false;
        };

        let stopped = supervisor.clear();
        debug!(result = %stopped, "Previous rotation tasks stopped");
        if let Err(failed) = self.start_tasks(&mut supervisor, &settings) {
            error!(failed, "Scoreboard rotation tasks failed to restart, keeping previous settings");
            if let Err(failed) = self.start_tasks(&mut supervisor, &previous) {
                error!(failed, "Previous rotation tasks failed to start, rotations are stopped");
            }
            return false;
        }

        if let Some(loaded) = self
            .loaded
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            loaded.settings = settings.clone();
        }
        if let Some(title) = settings.static_title() {
            for instance in self.repository.all() {
                instance.retitle(title);
            }
        }
        drop(supervisor);

        info!(mode = %settings.mode, "Scoreboard reloaded");
        true
    }

    /// Stop the tasks, release every overlay and close the session.
    ///
    /// Idempotent and safe on a manager that never loaded. Returns the worst
    /// task shutdown result.
    pub fn shutdown(&self) -> ShutdownResult {
        let mut supervisor = self.supervisor();
        let loaded = self
            .loaded
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let result = supervisor.clear();
        drop(supervisor);

        let released = self.repository.clear();

        if let Some(loaded) = loaded {
            loaded.session.close();
            info!(result = %result, released, "Scoreboard shut down");
        }
        result
    }

    /// Replace the supervisor's tasks with fresh ones for `settings` and
    /// start them. On failure nothing is left running; returns how many
    /// tasks failed.
    fn start_tasks(
        &self,
        supervisor: &mut TaskSupervisor,
        settings: &RotationSettings,
    ) -> Result<(), usize> {
        *supervisor = self.build_tasks(settings);
        let failures = supervisor.schedule_all(DEFAULT_PERIOD);
        if failures.is_empty() {
            return Ok(());
        }
        supervisor.clear();
        Err(failures.len())
    }

    fn build_tasks(&self, settings: &RotationSettings) -> TaskSupervisor {
        let mut supervisor = TaskSupervisor::new();

        let mut lines = RotationTask::new(
            RotationTarget::Line(settings.line_slot),
            settings.lines.clone(),
            Arc::clone(&self.repository),
            Arc::clone(&self.zones),
        );
        lines.set_period(settings.line_period);
        supervisor.add(lines);

        if settings.animated_title {
            let mut titles = RotationTask::new(
                RotationTarget::Title,
                FrameSource::Single(settings.titles.clone()),
                Arc::clone(&self.repository),
                Arc::clone(&self.zones),
            );
            titles.set_period(settings.title_period);
            supervisor.add(titles);
        }

        supervisor
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Per-client Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create an overlay for `client`, shown immediately.
    pub fn create(&self, client: &ClientId) -> CreateOutcome {
        {
            let loaded = self.loaded();
            let Some(loaded) = loaded.as_ref() else {
                return CreateOutcome::Inert;
            };
            if loaded.settings.mode == SelectionMode::Partitioned {
                let zone = self.zones.zone_of(client);
                if !loaded.settings.lines.accepts(zone.as_deref()) {
                    debug!(client = %client, zone = ?zone, "No scoreboard content for zone");
                    return CreateOutcome::NoPartition;
                }
            }
        }

        for hook in self.hooks() {
            if hook.before_create(client) == HookDecision::Deny {
                debug!(client = %client, "Scoreboard creation cancelled by hook");
                return CreateOutcome::Cancelled;
            }
        }

        // Held until registered so a concurrent shutdown clears this overlay
        let loaded = self.loaded();
        let Some(loaded) = loaded.as_ref() else {
            return CreateOutcome::Inert;
        };
        let handle = loaded.session.create_handle(client);
        if let Some(title) = loaded.settings.static_title() {
            handle.set_title(title);
        }
        handle.attach(client);
        self.repository.register(client.clone(), handle);
        debug!(client = %client, "Scoreboard created");
        CreateOutcome::Created
    }

    /// Flip the visibility of `client`'s overlay.
    ///
    /// Concurrent toggles of the same client are serialized: if the state
    /// changed while the hooks ran, the hooks are asked again with the new
    /// state.
    pub fn toggle(&self, client: &ClientId) -> ToggleOutcome {
        loop {
            let Some(instance) = self.repository.find(client) else {
                return ToggleOutcome::NoOverlay;
            };
            let current = instance.visibility();

            for hook in self.hooks() {
                if hook.before_toggle(client, current) == HookDecision::Deny {
                    debug!(client = %client, "Scoreboard toggle cancelled by hook");
                    return ToggleOutcome::NoOverlay;
                }
            }

            if let Some(visibility) = instance.toggle_from(current) {
                debug!(client = %client, visibility = %visibility, "Scoreboard toggled");
                return visibility.into();
            }
            if instance.is_released() {
                return ToggleOutcome::NoOverlay;
            }
            debug!(client = %client, "Scoreboard changed during toggle, retrying");
        }
    }

    /// Delete `client`'s overlay. Returns whether a renderer handle was
    /// released; false when there was no overlay.
    pub fn delete(&self, client: &ClientId) -> bool {
        if self.repository.find(client).is_none() {
            return false;
        }
        for hook in self.hooks() {
            hook.before_close(client);
        }
        let released = self.repository.unregister(client);
        debug!(client = %client, released, "Scoreboard deleted");
        released
    }

    /// Current visibility of `client`'s overlay.
    pub fn visibility(&self, client: &ClientId) -> Option<Visibility> {
        self.repository.find(client).map(|instance| instance.visibility())
    }
}

impl Drop for ScoreboardManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
