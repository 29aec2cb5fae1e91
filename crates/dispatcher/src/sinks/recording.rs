//! RecordingSink - keeps every write in memory

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use bytes::Bytes;
use contracts::{ArtifactTag, CaptureContext, ContractError, PictureSink};
use tracing::{info, instrument};

/// One `put_picture` call as seen by a [`RecordingSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureWrite {
    pub path: PathBuf,
    pub tag: ArtifactTag,
    pub data: Bytes,
}

/// Sink that records writes instead of encoding them
///
/// With [`persisting`](Self::persisting) the raw bytes are also written to
/// the requested path, so filesystem side effects can be observed.
pub struct RecordingSink {
    name: String,
    persist: bool,
    fail: bool,
    writes: Mutex<Vec<PictureWrite>>,
}

impl RecordingSink {
    /// Record only, touch nothing on disk
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            persist: false,
            fail: false,
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Record and write raw bytes to disk
    pub fn persisting(name: impl Into<String>) -> Self {
        Self {
            persist: true,
            ..Self::new(name)
        }
    }

    /// Reject every write
    pub fn failing(name: impl Into<String>) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }

    /// Writes so far, in call order
    pub fn writes(&self) -> Vec<PictureWrite> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn persist_raw(path: &Path, image: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, image)
    }
}

impl PictureSink for RecordingSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "recording_sink_put",
        skip(self, _ctx, image),
        fields(sink = %self.name, path = %path.display(), tag = %tag)
    )]
    fn put_picture(
        &self,
        _ctx: &CaptureContext,
        path: &Path,
        image: &[u8],
        tag: ArtifactTag,
    ) -> Result<(), ContractError> {
        if self.fail {
            return Err(ContractError::sink_write(&self.name, "writes disabled"));
        }
        if self.persist {
            Self::persist_raw(path, image)
                .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        }

        info!(
            sink = %self.name,
            path = %path.display(),
            tag = %tag,
            bytes = image.len(),
            "Picture recorded"
        );

        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(PictureWrite {
                path: path.to_path_buf(),
                tag,
                data: Bytes::copy_from_slice(image),
            });
        Ok(())
    }
}
