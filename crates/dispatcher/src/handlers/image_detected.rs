//! Writes one detection image per episode

use std::sync::Arc;

use contracts::{
    ArtifactTag, CaptureContext, Event, PictureSink, TimeFormatter, DEFAULT_JPEG_FILENAME,
};
use tracing::{debug, error, instrument, warn};

use super::{Disposition, EventHandler};
use crate::path;

pub struct ImageDetectedHandler {
    sink: Arc<dyn PictureSink>,
    formatter: Arc<dyn TimeFormatter>,
}

impl ImageDetectedHandler {
    pub fn new(sink: Arc<dyn PictureSink>, formatter: Arc<dyn TimeFormatter>) -> Self {
        Self { sink, formatter }
    }
}

impl EventHandler for ImageDetectedHandler {
    fn name(&self) -> &str {
        "image_detected"
    }

    #[instrument(
        name = "image_detected_handle",
        skip(self, ctx, event),
        fields(event_nr = ctx.episode.event_nr)
    )]
    fn handle(&self, ctx: &mut CaptureContext, event: &Event<'_>) -> Disposition {
        if !ctx.episode.is_new() {
            debug!("Detection image already written for this episode");
            return Disposition::Skipped;
        }
        let Some(image) = event.image else {
            warn!(kind = %event.kind, "Detection event raised without an image");
            return Disposition::Aborted;
        };

        let template =
            path::resolve_template(ctx.config.jpeg_filename.as_deref(), DEFAULT_JPEG_FILENAME);
        let ext = ctx.config.image_ext();
        let full_path = path::expand(
            self.formatter.as_ref(),
            ctx,
            template,
            &event.timestamp,
            ext,
        );

        if let Err(e) = self
            .sink
            .put_picture(ctx, &full_path, image, ArtifactTag::Image)
        {
            error!(path = %full_path.display(), error = %e, "Could not write detection image");
            return Disposition::Aborted;
        }

        ctx.episode.mark_recorded();
        Disposition::Acted
    }
}
