//! PictureSink implementations
//!
//! Contains ImageFileSink and RecordingSink.

mod file;
mod recording;

pub use self::file::ImageFileSink;
pub use self::recording::{PictureWrite, RecordingSink};
