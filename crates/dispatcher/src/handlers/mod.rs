//! Event handlers
//!
//! Each handler decides on its own whether to act. Failures are logged here
//! and reported to the dispatcher only as a [`Disposition`].

mod file_created;
mod image_detected;
mod motion_mask;
mod snapshot;

pub use self::file_created::FileCreatedHandler;
pub use self::image_detected::ImageDetectedHandler;
pub use self::motion_mask::MotionMaskHandler;
pub use self::snapshot::SnapshotHandler;

use contracts::{CaptureContext, Event};

/// What a handler did with one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Wrote or logged something
    Acted,
    /// Nothing to do for this event
    Skipped,
    /// Stopped after a failure that was already logged
    Aborted,
}

/// Reaction to a raised event
pub trait EventHandler: Send + Sync {
    /// Handler name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Receives the event exactly as raised, including every kind bit
    fn handle(&self, ctx: &mut CaptureContext, event: &Event<'_>) -> Disposition;
}
