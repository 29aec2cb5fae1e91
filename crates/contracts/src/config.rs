//! CaptureConfig - Config Loader output
//!
//! Output directory, filename templates and image format settings consumed by
//! the event handlers.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ContractError;

/// Template used when the detection image template is absent or cleared
pub const DEFAULT_JPEG_FILENAME: &str = "%v-%Y%m%d%H%M%S-%q";

/// Template used when the snapshot template is absent or cleared
pub const DEFAULT_SNAPSHOT_FILENAME: &str = "%v-%Y%m%d%H%M%S-snapshot";

/// Snapshot template value selecting overwrite mode
pub const LASTSNAP: &str = "lastsnap";

/// Largest frame buffer a context will hold, in bytes
pub const MAX_FRAME_BYTES: usize = 256 * 1024 * 1024;

/// Capture output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CaptureConfig {
    /// Base output directory
    #[serde(default = "default_target_dir")]
    pub target_dir: PathBuf,

    /// Detection image filename template, relative to `target_dir`
    #[serde(default = "default_jpeg_filename")]
    pub jpeg_filename: Option<String>,

    /// Snapshot filename template, or `"lastsnap"` to always overwrite
    #[serde(default = "default_snapshot_filename")]
    pub snapshot_filename: Option<String>,

    /// Write PPM instead of JPEG
    #[serde(default)]
    pub ppm: bool,

    /// Also persist motion-mask images
    #[serde(default)]
    pub motion_img: bool,

    /// JPEG quality
    #[serde(default = "default_quality")]
    #[validate(range(min = 1, max = 100))]
    pub quality: u8,

    /// Frame width in pixels, bounded by the JPEG encoder
    #[serde(default = "default_width")]
    #[validate(range(min = 1, max = 65535))]
    pub width: u32,

    /// Frame height in pixels
    #[serde(default = "default_height")]
    #[validate(range(min = 1, max = 65535))]
    pub height: u32,

    #[serde(default)]
    pub pixel_format: PixelFormat,
}

fn default_target_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_jpeg_filename() -> Option<String> {
    Some(DEFAULT_JPEG_FILENAME.to_string())
}

fn default_snapshot_filename() -> Option<String> {
    Some(DEFAULT_SNAPSHOT_FILENAME.to_string())
}

fn default_quality() -> u8 {
    75
}

fn default_width() -> u32 {
    352
}

fn default_height() -> u32 {
    288
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            target_dir: default_target_dir(),
            jpeg_filename: default_jpeg_filename(),
            snapshot_filename: default_snapshot_filename(),
            ppm: false,
            motion_img: false,
            quality: default_quality(),
            width: default_width(),
            height: default_height(),
            pixel_format: PixelFormat::default(),
        }
    }
}

impl CaptureConfig {
    /// Image file extension without the dot
    pub fn image_ext(&self) -> &'static str {
        if self.ppm {
            "ppm"
        } else {
            "jpg"
        }
    }

    /// Geometry every pixel buffer must match
    pub fn geometry(&self) -> FrameGeometry {
        FrameGeometry {
            width: self.width,
            height: self.height,
            format: self.pixel_format,
        }
    }

    /// Whether snapshots overwrite `lastsnap.<ext>` instead of being timestamped
    pub fn snapshot_overwrites(&self) -> bool {
        self.snapshot_filename.as_deref() == Some(LASTSNAP)
    }
}

/// Pixel layout of raw frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    #[default]
    Rgb8,
    Gray8,
}

impl PixelFormat {
    pub fn channels(&self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Gray8 => 1,
        }
    }
}

/// Frame dimensions and layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl FrameGeometry {
    /// Expected buffer length in bytes
    ///
    /// Fails when the product overflows or exceeds [`MAX_FRAME_BYTES`].
    pub fn frame_len(&self) -> Result<usize, ContractError> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|pixels| pixels.checked_mul(self.format.channels()))
            .filter(|&len| len <= MAX_FRAME_BYTES)
            .ok_or(ContractError::FrameGeometry {
                width: self.width,
                height: self.height,
            })
    }
}
