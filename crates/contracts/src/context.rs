//! CaptureContext - state shared by every handler of one camera
//!
//! Mutated only by the thread that raises events. Hosts with several cameras
//! keep one context per camera.

use crate::CaptureConfig;

/// Episode numbering used to write one detection image per episode.
///
/// `event_nr` is advanced by the host when a new detection episode starts;
/// `prev_event` is the watermark of the last episode that produced an image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpisodeTracker {
    pub event_nr: u64,
    pub prev_event: u64,
}

impl EpisodeTracker {
    /// Start a new episode and return its number
    pub fn begin(&mut self) -> u64 {
        self.event_nr += 1;
        self.event_nr
    }

    /// True until [`mark_recorded`](Self::mark_recorded) is called for the current episode
    pub fn is_new(&self) -> bool {
        self.event_nr != self.prev_event
    }

    pub fn mark_recorded(&mut self) {
        self.prev_event = self.event_nr;
    }
}

/// Long-lived per-camera state
#[derive(Debug, Clone, Default)]
pub struct CaptureContext {
    pub config: CaptureConfig,

    /// Latest motion-mask frame, same geometry as captured frames
    pub motion_mask: Vec<u8>,

    pub episode: EpisodeTracker,

    /// Shot number within the current second (`%q`)
    pub shot: u32,

    /// Camera thread number (`%t`)
    pub thread_nr: u32,

    /// User supplied text (`%C`)
    pub text_event: String,

    /// Set by the host when a snapshot is due, cleared by the snapshot handler
    pub snapshot_pending: bool,
}

impl CaptureContext {
    /// The mask is left empty when the geometry has no valid frame length.
    pub fn new(config: CaptureConfig) -> Self {
        let motion_mask = config
            .geometry()
            .frame_len()
            .map(|len| vec![0; len])
            .unwrap_or_default();
        Self {
            config,
            motion_mask,
            ..Self::default()
        }
    }
}
