//! Writes the context's motion mask next to the detection image

use std::sync::Arc;

use contracts::{
    ArtifactTag, CaptureContext, Event, PictureSink, TimeFormatter, DEFAULT_JPEG_FILENAME,
};
use tracing::{error, instrument};

use super::{Disposition, EventHandler};
use crate::path;

/// Suffix distinguishing mask files from detection images
const MOTION_SUFFIX: &str = "m";

/// Persists `ctx.motion_mask`, never the event image.
pub struct MotionMaskHandler {
    sink: Arc<dyn PictureSink>,
    formatter: Arc<dyn TimeFormatter>,
}

impl MotionMaskHandler {
    pub fn new(sink: Arc<dyn PictureSink>, formatter: Arc<dyn TimeFormatter>) -> Self {
        Self { sink, formatter }
    }
}

impl EventHandler for MotionMaskHandler {
    fn name(&self) -> &str {
        "motion_mask_detected"
    }

    #[instrument(
        name = "motion_mask_handle",
        skip(self, ctx, event),
        fields(event_nr = ctx.episode.event_nr)
    )]
    fn handle(&self, ctx: &mut CaptureContext, event: &Event<'_>) -> Disposition {
        if !ctx.config.motion_img {
            return Disposition::Skipped;
        }

        let template =
            path::resolve_template(ctx.config.jpeg_filename.as_deref(), DEFAULT_JPEG_FILENAME);
        let name = path::artifact_name(
            self.formatter.as_ref(),
            ctx,
            template,
            &event.timestamp,
            MOTION_SUFFIX,
            ctx.config.image_ext(),
        );
        let full_path = ctx.config.target_dir.join(name);

        match self
            .sink
            .put_picture(ctx, &full_path, &ctx.motion_mask, ArtifactTag::MotionImage)
        {
            Ok(()) => Disposition::Acted,
            Err(e) => {
                error!(path = %full_path.display(), error = %e, "Could not write motion image");
                Disposition::Aborted
            }
        }
    }
}
