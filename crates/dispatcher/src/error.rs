//! Dispatcher error types
//!
//! Raised only while assembling a dispatcher. Dispatching itself never fails.

use std::path::PathBuf;

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Output directory could not be created
    #[error("cannot prepare target directory '{}': {source}", path.display())]
    TargetDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configured geometry yields zero-length frames
    #[error("frame geometry {width}x{height} holds no pixels")]
    EmptyFrame { width: u32, height: u32 },

    /// Configured geometry is too large to hold
    #[error("invalid frame geometry: {0}")]
    Geometry(#[from] contracts::ContractError),
}

impl DispatcherError {
    pub fn target_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::TargetDir {
            path: path.into(),
            source,
        }
    }
}
