//! Bulk scheduling and shutdown of rotation tasks

use std::time::Duration;

use tracing::{info, warn};

use super::rotator::RotationTarget;
use super::task::{RotationTask, ScheduleError, ShutdownResult};

/// Owns the rotation tasks of a loaded manager.
#[derive(Debug, Default)]
pub struct TaskSupervisor {
    tasks: Vec<RotationTask>,
}

impl TaskSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, task: RotationTask) {
        self.tasks.push(task);
    }

    pub fn tasks(&self) -> &[RotationTask] {
        &self.tasks
    }

    pub fn task(&self, target: RotationTarget) -> Option<&RotationTask> {
        self.tasks.iter().find(|task| task.target() == target)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Start every task that is not already running, applying `default` to
    /// tasks without a period. Failures are logged and returned; the other
    /// tasks are still started.
    pub fn schedule_all(&mut self, default: Duration) -> Vec<ScheduleError> {
        let mut failures = Vec::new();
        for task in &mut self.tasks {
            if task.is_running() {
                continue;
            }
            if task.period().is_none() {
                info!(
                    task = task.name(),
                    default_secs = default.as_secs(),
                    "No valid period configured, using default"
                );
                task.set_period(Some(default));
            }
            if let Err(err) = task.schedule() {
                warn!(error = %err, "Failed to schedule rotation task");
                failures.push(err);
            }
        }
        failures
    }

    /// Stop every task and report the worst result.
    pub fn shutdown_all(&mut self) -> ShutdownResult {
        let mut worst = ShutdownResult::AlreadyShutdown;
        for task in &mut self.tasks {
            let result = task.shutdown();
            if result.is_clean() {
                info!(task = task.name(), result = %result, "Rotation task stopped");
            } else {
                warn!(task = task.name(), result = %result, "Rotation task stopped uncleanly");
            }
            worst = worst.max(result);
        }
        worst
    }

    /// Stop everything and forget the tasks.
    pub fn clear(&mut self) -> ShutdownResult {
        let worst = self.shutdown_all();
        self.tasks.clear();
        worst
    }
}
