//! Periodic content rotation
//!
//! Two independent tasks animate every visible overlay:
//!
//! ```text
//!   line task  ──tick──▶ cursor++ ──▶ snapshot(repository) ──▶ set_line(slot, frame)
//!   title task ──tick──▶ cursor++ ──▶ snapshot(repository) ──▶ set_title(frame)
//! ```
//!
//! Each task has its own thread and timer. The [`TaskSupervisor`] starts
//! and stops them as a group.

mod cursor;
mod rotator;
mod supervisor;
mod task;


pub use cursor::RotationCursor;
pub use rotator::{RotationTarget, Rotator, TickReport};
pub use supervisor::TaskSupervisor;
pub use task::{DEFAULT_PERIOD, RotationTask, SHUTDOWN_GRACE, ScheduleError, ShutdownResult};
#[cfg(test)]
pub(crate) use task::fail_next_spawns;
