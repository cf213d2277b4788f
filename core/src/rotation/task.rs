//! Scheduled rotation task
//!
//! Each task owns a dedicated OS thread running a current-thread tokio
//! runtime, so a slow renderer on one rotation never delays the other.
//! Shutdown cancels the worker and waits a bounded grace period for it to
//! finish its current tick.

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::rotator::{RotationTarget, Rotator};
use crate::client::ZoneLookup;
use crate::config::FrameSource;
use crate::overlay::OverlayRepository;

/// How long shutdown waits for an in-flight tick.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Period applied to tasks whose configured rate was not positive.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(20);

#[cfg(test)]
thread_local! {
    static FAILING_SPAWNS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Make the next `count` schedules on this thread fail to spawn.
#[cfg(test)]
pub(crate) fn fail_next_spawns(count: usize) {
    FAILING_SPAWNS.with(|failing| failing.set(count));
}

#[cfg(test)]
fn spawn_should_fail() -> bool {
    FAILING_SPAWNS.with(|failing| {
        let left = failing.get();
        failing.set(left.saturating_sub(1));
        left > 0
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Results
// ─────────────────────────────────────────────────────────────────────────────

/// How a task's shutdown went, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShutdownResult {
    /// The task was not running
    AlreadyShutdown,
    /// The worker finished within the grace period
    ShutdownWithTermination,
    /// The grace period expired; the worker was abandoned
    ShutdownImmediate,
    /// The worker died while stopping
    Error,
}

impl ShutdownResult {
    pub fn code(&self) -> u8 {
        match self {
            ShutdownResult::AlreadyShutdown => 0,
            ShutdownResult::ShutdownWithTermination => 1,
            ShutdownResult::ShutdownImmediate => 2,
            ShutdownResult::Error => 3,
        }
    }

    /// True when the worker stopped on its own (or was never running).
    pub fn is_clean(&self) -> bool {
        matches!(
            self,
            ShutdownResult::AlreadyShutdown | ShutdownResult::ShutdownWithTermination
        )
    }
}

impl fmt::Display for ShutdownResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ShutdownResult::AlreadyShutdown => "Thread Already Shutdown",
            ShutdownResult::ShutdownWithTermination => "Thread Shutdown With Termination",
            ShutdownResult::ShutdownImmediate => "Thread Shutdown Immediate",
            ShutdownResult::Error => "Thread Shutdown Error",
        };
        write!(f, "{} ({})", self.code(), label)
    }
}

/// Errors while starting a rotation task
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("{task} is already running")]
    AlreadyRunning { task: &'static str },

    #[error("{task} has no period set")]
    PeriodUnset { task: &'static str },

    #[error("{task} has no frames to rotate")]
    EmptySequence { task: &'static str },

    #[error("failed to build runtime for {task}")]
    Runtime {
        task: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn thread for {task}")]
    Spawn {
        task: &'static str,
        #[source]
        source: io::Error,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Rotation Task
// ─────────────────────────────────────────────────────────────────────────────

/// Handles to a running worker thread.
struct Worker {
    token: CancellationToken,
    abort: Arc<AtomicBool>,
    done_rx: Receiver<()>,
    thread: JoinHandle<()>,
}

/// A periodic rotation over all overlays, running on its own thread.
pub struct RotationTask {
    target: RotationTarget,
    frames: FrameSource,
    period: Option<Duration>,
    grace: Duration,
    repository: Arc<OverlayRepository>,
    zones: Arc<dyn ZoneLookup>,
    ticks: Arc<AtomicU64>,
    worker: Option<Worker>,
}

impl fmt::Debug for RotationTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotationTask")
            .field("target", &self.target)
            .field("period", &self.period)
            .field("running", &self.is_running())
            .field("ticks", &self.ticks())
            .finish()
    }
}

impl RotationTask {
    pub fn new(
        target: RotationTarget,
        frames: FrameSource,
        repository: Arc<OverlayRepository>,
        zones: Arc<dyn ZoneLookup>,
    ) -> Self {
        Self {
            target,
            frames,
            period: None,
            grace: SHUTDOWN_GRACE,
            repository,
            zones,
            ticks: Arc::new(AtomicU64::new(0)),
            worker: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn name(&self) -> &'static str {
        self.target.name()
    }

    pub fn target(&self) -> RotationTarget {
        self.target
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// Set the period in seconds. Zero or negative leaves it unset.
    pub fn set_period_rate(&mut self, seconds: i64) {
        self.period = u64::try_from(seconds)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
    }

    pub fn set_period(&mut self, period: Option<Duration>) {
        self.period = period.filter(|p| !p.is_zero());
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Running, but the worker thread has already exited (it panicked).
    pub fn has_died(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| worker.thread.is_finished())
    }

    /// Completed ticks since the task was created.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Start ticking. The first tick runs immediately, then every period.
    pub fn schedule(&mut self) -> Result<(), ScheduleError> {
        let task = self.name();
        if self.is_running() {
            return Err(ScheduleError::AlreadyRunning { task });
        }
        let period = self.period.ok_or(ScheduleError::PeriodUnset { task })?;
        if self.frames.is_empty() {
            return Err(ScheduleError::EmptySequence { task });
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|source| ScheduleError::Runtime { task, source })?;

        #[cfg(test)]
        if spawn_should_fail() {
            return Err(ScheduleError::Spawn {
                task,
                source: io::Error::other("spawn refused"),
            });
        }

        let token = CancellationToken::new();
        let abort = Arc::new(AtomicBool::new(false));
        let (done_tx, done_rx) = mpsc::sync_channel::<()>(1);
        let mut rotator = Rotator::new(
            self.target,
            self.frames.clone(),
            Arc::clone(&self.repository),
            Arc::clone(&self.zones),
        );

        let worker_token = token.clone();
        let worker_abort = Arc::clone(&abort);
        let ticks = Arc::clone(&self.ticks);

        let thread = thread::Builder::new()
            .name(format!("scoreboard-{task}"))
            .spawn(move || {
                runtime.block_on(async move {
                    let mut interval = tokio::time::interval(period);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                    loop {
                        tokio::select! {
                            biased;
                            _ = worker_token.cancelled() => break,
                            _ = interval.tick() => {
                                let report = rotator.tick(&worker_abort);
                                ticks.fetch_add(1, Ordering::AcqRel);
                                debug!(
                                    task,
                                    pushed = report.pushed,
                                    hidden = report.hidden,
                                    unzoned = report.unzoned,
                                    "Rotation tick"
                                );
                                if report.aborted {
                                    break;
                                }
                            }
                        }
                    }
                });
                let _ = done_tx.send(());
            })
            .map_err(|source| ScheduleError::Spawn { task, source })?;

        self.worker = Some(Worker {
            token,
            abort,
            done_rx,
            thread,
        });
        info!(task, period_secs = period.as_secs(), "Rotation task scheduled");
        Ok(())
    }

    /// Stop the task, waiting up to the grace period for the current tick.
    ///
    /// The task counts as stopped as soon as this is called, whatever the
    /// result. Calling it again returns [`ShutdownResult::AlreadyShutdown`].
    pub fn shutdown(&mut self) -> ShutdownResult {
        let task = self.name();
        let Some(worker) = self.worker.take() else {
            return ShutdownResult::AlreadyShutdown;
        };

        worker.token.cancel();
        match worker.done_rx.recv_timeout(self.grace) {
            Ok(()) => match worker.thread.join() {
                Ok(()) => ShutdownResult::ShutdownWithTermination,
                Err(_) => {
                    error!(task, "Rotation worker panicked while stopping");
                    ShutdownResult::Error
                }
            },
            Err(RecvTimeoutError::Timeout) => {
                // Stop the stuck tick at the next overlay and leave the
                // thread to finish on its own.
                worker.abort.store(true, Ordering::Release);
                warn!(
                    task,
                    grace_ms = self.grace.as_millis() as u64,
                    "Rotation worker did not stop in time, abandoning it"
                );
                ShutdownResult::ShutdownImmediate
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = worker.thread.join();
                error!(task, "Rotation worker died");
                ShutdownResult::Error
            }
        }
    }
}

impl Drop for RotationTask {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.token.cancel();
            worker.abort.store(true, Ordering::Release);
        }
    }
}
