//! PictureSink trait - persistence interface consumed by the handlers
//!
//! Defines how a pixel buffer reaches the filesystem.

use std::path::Path;

use crate::{ArtifactTag, CaptureContext, ContractError};

/// Picture persistence trait
///
/// Implementations own their failure behavior. Handlers log a returned error
/// and stop the current invocation; it never reaches the dispatcher.
pub trait PictureSink: Send + Sync {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write `image` to `path` in the format configured on `ctx`
    ///
    /// # Errors
    /// Returns write error (should include context)
    fn put_picture(
        &self,
        ctx: &CaptureContext,
        path: &Path,
        image: &[u8],
        tag: ArtifactTag,
    ) -> Result<(), ContractError>;
}
