//! Event - the value raised by the detection pipeline
//!
//! An event lives for exactly one dispatch call. It borrows the pixel buffer
//! and the filename from the caller instead of owning them.

use std::fmt;
use std::path::Path;

use bitflags::bitflags;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Class of occurrence, OR-combinable.
    ///
    /// Bit values are stable and shared with the capture loop.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct EventKind: u32 {
        const FILE_CREATE     = 1 << 0;
        const MOTION          = 1 << 1;
        const FIRST_MOTION    = 1 << 2;
        const END_MOTION      = 1 << 3;
        const STOP            = 1 << 4;
        const TIMELAPSE       = 1 << 5;
        const TIMELAPSE_END   = 1 << 6;
        const STREAM          = 1 << 7;
        const IMAGE_DETECTED  = 1 << 8;
        const IMAGEM_DETECTED = 1 << 9;
        const IMAGE_SNAPSHOT  = 1 << 10;
        const IMAGE           = 1 << 11;
        const IMAGEM          = 1 << 12;
        const FFMPEG_PUT      = 1 << 13;
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        bitflags::parser::to_writer(self, f)
    }
}

/// Semantic purpose of a buffer handed to the persistence sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactTag {
    /// Detection image
    Image,
    /// Motion-mask image
    MotionImage,
    /// Periodic or on-demand snapshot
    Snapshot,
}

impl ArtifactTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::MotionImage => "motion_image",
            Self::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for ArtifactTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Movie outputs announced through `FILE_CREATE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovieKind {
    Normal,
    Motion,
    Timelapse,
}

impl MovieKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "movie",
            Self::Motion => "motion_movie",
            Self::Timelapse => "timelapse",
        }
    }
}

/// Handler-specific payload attached to an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SideData {
    #[default]
    None,
    /// A picture artifact was produced
    Picture(ArtifactTag),
    /// A movie artifact was produced
    Movie(MovieKind),
}

impl SideData {
    /// File type label used in logs
    pub fn file_type(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Picture(tag) => Some(tag.as_str()),
            Self::Movie(kind) => Some(kind.as_str()),
        }
    }
}

/// One raised occurrence
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    /// Full kind as raised, possibly compound
    pub kind: EventKind,
    /// Raw pixel data owned by the capture pipeline
    pub image: Option<&'a [u8]>,
    /// Path of the file the event refers to
    pub filename: Option<&'a Path>,
    pub side_data: SideData,
    /// Local wall-clock time of the occurrence
    pub timestamp: NaiveDateTime,
}

impl<'a> Event<'a> {
    pub fn new(kind: EventKind, timestamp: NaiveDateTime) -> Self {
        Self {
            kind,
            image: None,
            filename: None,
            side_data: SideData::None,
            timestamp,
        }
    }

    pub fn with_image(mut self, image: &'a [u8]) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_filename(mut self, filename: &'a Path) -> Self {
        self.filename = Some(filename);
        self
    }

    pub fn with_side_data(mut self, side_data: SideData) -> Self {
        self.side_data = side_data;
        self
    }
}
