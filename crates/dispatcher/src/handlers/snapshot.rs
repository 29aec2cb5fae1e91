//! Writes snapshots and keeps `lastsnap.<ext>` pointing at the newest one

use std::path::Path;
use std::sync::Arc;

use contracts::{
    ArtifactTag, CaptureContext, Event, PictureSink, TimeFormatter, DEFAULT_SNAPSHOT_FILENAME,
};
use tracing::{error, info, instrument, warn};

use super::{Disposition, EventHandler};
use crate::path;

/// Two modes, picked by `snapshot_filename`:
///
/// - timestamped: write `<expanded>.<ext>`, then relink `lastsnap.<ext>` to it
/// - `"lastsnap"`: replace `lastsnap.<ext>` in place, no link
///
/// `snapshot_pending` is cleared only when the mode completed.
pub struct SnapshotHandler {
    sink: Arc<dyn PictureSink>,
    formatter: Arc<dyn TimeFormatter>,
}

impl SnapshotHandler {
    pub fn new(sink: Arc<dyn PictureSink>, formatter: Arc<dyn TimeFormatter>) -> Self {
        Self { sink, formatter }
    }

    fn write_timestamped(
        &self,
        ctx: &CaptureContext,
        event: &Event<'_>,
        image: &[u8],
    ) -> Disposition {
        let template = path::resolve_template(
            ctx.config.snapshot_filename.as_deref(),
            DEFAULT_SNAPSHOT_FILENAME,
        );
        let name = path::artifact_name(
            self.formatter.as_ref(),
            ctx,
            template,
            &event.timestamp,
            "",
            ctx.config.image_ext(),
        );
        let full_path = ctx.config.target_dir.join(&name);

        if let Err(e) = self
            .sink
            .put_picture(ctx, &full_path, image, ArtifactTag::Snapshot)
        {
            error!(path = %full_path.display(), error = %e, "Could not write snapshot");
            return Disposition::Aborted;
        }

        // Link only after the target exists.
        let link_path = path::lastsnap_path(ctx);
        if let Err(e) = path::refresh_latest_link(Path::new(&name), &link_path) {
            error!(filename = %name, error = %e, "Could not create symbolic link");
            return Disposition::Aborted;
        }

        info!(path = %full_path.display(), link = %link_path.display(), "Snapshot written");
        Disposition::Acted
    }

    fn overwrite_lastsnap(&self, ctx: &CaptureContext, image: &[u8]) -> Disposition {
        let full_path = path::lastsnap_path(ctx);

        if let Err(e) = path::remove_if_exists(&full_path) {
            warn!(path = %full_path.display(), error = %e, "Could not remove previous snapshot");
        }

        if let Err(e) = self
            .sink
            .put_picture(ctx, &full_path, image, ArtifactTag::Snapshot)
        {
            error!(path = %full_path.display(), error = %e, "Could not write snapshot");
            return Disposition::Aborted;
        }

        info!(path = %full_path.display(), "Snapshot written");
        Disposition::Acted
    }
}

impl EventHandler for SnapshotHandler {
    fn name(&self) -> &str {
        "image_snapshot"
    }

    #[instrument(
        name = "snapshot_handle",
        skip(self, ctx, event),
        fields(overwrite = ctx.config.snapshot_overwrites())
    )]
    fn handle(&self, ctx: &mut CaptureContext, event: &Event<'_>) -> Disposition {
        let Some(image) = event.image else {
            warn!(kind = %event.kind, "Snapshot event raised without an image");
            return Disposition::Aborted;
        };

        let disposition = if ctx.config.snapshot_overwrites() {
            self.overwrite_lastsnap(ctx, image)
        } else {
            self.write_timestamped(ctx, event, image)
        };

        if disposition == Disposition::Acted {
            ctx.snapshot_pending = false;
        }
        disposition
    }
}
