//! Rotation tick body

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::trace;

use super::cursor::{RotationCursor, wrap};
use crate::client::{Visibility, ZoneLookup};
use crate::config::FrameSource;
use crate::overlay::OverlayRepository;

/// What a rotation task writes on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationTarget {
    /// A fixed line slot of every overlay
    Line(usize),
    /// The overlay title
    Title,
}

impl RotationTarget {
    /// Short name used for thread names and log fields.
    pub fn name(&self) -> &'static str {
        match self {
            RotationTarget::Line(_) => "line-rotator",
            RotationTarget::Title => "title-rotator",
        }
    }
}

/// Outcome of a single tick, mostly for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub pushed: usize,
    pub hidden: usize,
    /// Clients whose zone has no configured sequence
    pub unzoned: usize,
    /// Tick stopped early because the task was abandoned
    pub aborted: bool,
}

/// Advances a cursor and pushes the current frame to every visible overlay.
pub struct Rotator {
    target: RotationTarget,
    frames: FrameSource,
    cursor: RotationCursor,
    repository: Arc<OverlayRepository>,
    zones: Arc<dyn ZoneLookup>,
}

impl Rotator {
    pub fn new(
        target: RotationTarget,
        frames: FrameSource,
        repository: Arc<OverlayRepository>,
        zones: Arc<dyn ZoneLookup>,
    ) -> Self {
        Self {
            target,
            frames,
            cursor: RotationCursor::new(),
            repository,
            zones,
        }
    }

    pub fn target(&self) -> RotationTarget {
        self.target
    }

    pub fn cursor(&self) -> RotationCursor {
        self.cursor
    }

    /// Run one rotation step.
    ///
    /// The cursor moves before any overlay is touched, so a tick that dies
    /// halfway still leaves the rotation on the next frame. Overlays are
    /// walked over a snapshot; creations and deletions racing with the tick
    /// are seen on the next one. `abort` is checked between overlays.
    pub fn tick(&mut self, abort: &AtomicBool) -> TickReport {
        let position = self.cursor.advance();
        let mut report = TickReport::default();

        for instance in self.repository.all() {
            if abort.load(Ordering::Acquire) {
                report.aborted = true;
                break;
            }
            if instance.visibility() == Visibility::Hidden {
                report.hidden += 1;
                continue;
            }

            let zone = match &self.frames {
                FrameSource::Single(_) => None,
                FrameSource::Partitioned(_) => self.zones.zone_of(instance.id()),
            };
            let Some(frame) = self
                .frames
                .sequence_for(zone.as_deref())
                .and_then(|sequence| wrap(position, sequence.len()).map(|i| &sequence[i]))
            else {
                trace!(client = %instance.id(), zone = ?zone, "No frames for zone");
                report.unzoned += 1;
                continue;
            };

            let target = self.target;
            let pushed = instance.push_if_visible(|renderer| match target {
                RotationTarget::Line(slot) => renderer.set_line(slot, frame),
                RotationTarget::Title => renderer.set_title(frame),
            });
            if pushed {
                report.pushed += 1;
            } else {
                // Hidden or released since the snapshot
                report.hidden += 1;
            }
        }

        report
    }
}
