//! ImageFileSink - encodes frames to JPEG or PPM on disk

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use contracts::{ArtifactTag, CaptureContext, ContractError, PictureSink, PixelFormat};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::pnm::PnmEncoder;
use image::{ExtendedColorType, ImageEncoder};
use tracing::{debug, error, instrument};

/// Sink that encodes frames with the `image` crate
///
/// JPEG honours `quality`; PPM is chosen when the `ppm` flag is set.
pub struct ImageFileSink {
    name: String,
    created_dirs: Mutex<HashSet<PathBuf>>,
}

impl ImageFileSink {
    /// Create a new ImageFileSink rooted at `base_path`
    pub fn new(name: impl Into<String>, base_path: &Path) -> std::io::Result<Self> {
        // Create base directory if it doesn't exist
        fs::create_dir_all(base_path)?;

        let mut created = HashSet::new();
        created.insert(base_path.to_path_buf());

        Ok(Self {
            name: name.into(),
            created_dirs: Mutex::new(created),
        })
    }

    /// Templates may contain `/`, so parents are created on demand.
    fn ensure_parent(&self, path: &Path) -> std::io::Result<()> {
        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };

        let mut created = self
            .created_dirs
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !created.contains(parent) {
            fs::create_dir_all(parent)?;
            created.insert(parent.to_path_buf());
        }
        Ok(())
    }

    fn encode(&self, ctx: &CaptureContext, path: &Path, image: &[u8]) -> Result<(), ContractError> {
        let geometry = ctx.config.geometry();
        let expected = geometry.frame_len()?;
        if image.len() != expected {
            return Err(ContractError::FrameSize {
                expected,
                actual: image.len(),
            });
        }

        let color = match geometry.format {
            PixelFormat::Rgb8 => ExtendedColorType::Rgb8,
            PixelFormat::Gray8 => ExtendedColorType::L8,
        };

        // Encode fully in memory so a failed encode never touches `path`.
        let mut encoded = Vec::with_capacity(expected / 4);
        let result = if ctx.config.ppm {
            // P6 for rgb8, P5 for gray8
            PnmEncoder::new(&mut encoded).write_image(
                image,
                geometry.width,
                geometry.height,
                color,
            )
        } else {
            JpegEncoder::new_with_quality(&mut encoded, ctx.config.quality).write_image(
                image,
                geometry.width,
                geometry.height,
                color,
            )
        };
        result.map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;

        self.ensure_parent(path)?;
        fs::write(path, &encoded)?;
        Ok(())
    }
}

impl PictureSink for ImageFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "image_file_sink_put",
        skip(self, ctx, image),
        fields(sink = %self.name, path = %path.display(), tag = %tag)
    )]
    fn put_picture(
        &self,
        ctx: &CaptureContext,
        path: &Path,
        image: &[u8],
        tag: ArtifactTag,
    ) -> Result<(), ContractError> {
        self.encode(ctx, path, image).inspect_err(|e| {
            error!(sink = %self.name, path = %path.display(), error = %e, "Write failed");
        })?;
        debug!(sink = %self.name, path = %path.display(), "Picture written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::CaptureConfig;
    use tempfile::tempdir;

    fn ctx_in(dir: &Path, ppm: bool) -> CaptureContext {
        CaptureContext::new(CaptureConfig {
            target_dir: dir.to_path_buf(),
            ppm,
            width: 4,
            height: 2,
            ..CaptureConfig::default()
        })
    }

    #[test]
    fn test_write_jpeg_creates_nested_dirs() {
        let dir = tempdir().unwrap();
        let ctx = ctx_in(dir.path(), false);
        let sink = ImageFileSink::new("test_file", dir.path()).unwrap();

        let path = dir.path().join("20240102/030405-01.jpg");
        sink.put_picture(&ctx, &path, &[128u8; 24], ArtifactTag::Image)
            .unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_write_ppm() {
        let dir = tempdir().unwrap();
        let ctx = ctx_in(dir.path(), true);
        let sink = ImageFileSink::new("test_file", dir.path()).unwrap();

        let path = dir.path().join("snap.ppm");
        sink.put_picture(&ctx, &path, &[10u8; 24], ArtifactTag::Snapshot)
            .unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"P6");
    }

    #[test]
    fn test_write_gray_ppm() {
        let dir = tempdir().unwrap();
        let mut ctx = ctx_in(dir.path(), true);
        ctx.config.pixel_format = PixelFormat::Gray8;
        let sink = ImageFileSink::new("test_file", dir.path()).unwrap();

        let path = dir.path().join("mask.ppm");
        sink.put_picture(&ctx, &path, &[255u8; 8], ArtifactTag::MotionImage)
            .unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"P5");
    }

    #[test]
    fn test_rejects_wrong_frame_size() {
        let dir = tempdir().unwrap();
        let ctx = ctx_in(dir.path(), false);
        let sink = ImageFileSink::new("test_file", dir.path()).unwrap();

        let path = dir.path().join("bad.jpg");
        let err = sink
            .put_picture(&ctx, &path, &[0u8; 5], ArtifactTag::Image)
            .unwrap_err();

        assert!(matches!(
            err,
            ContractError::FrameSize {
                expected: 24,
                actual: 5
            }
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_encode_leaves_no_file() {
        let dir = tempdir().unwrap();
        let mut ctx = ctx_in(dir.path(), false);
        ctx.config.width = 70000;
        ctx.config.height = 1;
        let sink = ImageFileSink::new("test_file", dir.path()).unwrap();

        let path = dir.path().join("wide/x.jpg");
        let err = sink
            .put_picture(&ctx, &path, &vec![0u8; 70000 * 3], ArtifactTag::Snapshot)
            .unwrap_err();

        assert!(matches!(err, ContractError::SinkWrite { .. }));
        assert!(fs::symlink_metadata(&path).is_err());
        assert!(!dir.path().join("wide").exists());
    }
}
