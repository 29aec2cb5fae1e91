//! Logs every newly created output file

use contracts::{CaptureContext, Event};
use tracing::info;

use super::{Disposition, EventHandler};

pub struct FileCreatedHandler;

impl EventHandler for FileCreatedHandler {
    fn name(&self) -> &str {
        "file_created"
    }

    fn handle(&self, _ctx: &mut CaptureContext, event: &Event<'_>) -> Disposition {
        let path = event
            .filename
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        info!(
            path = %path,
            file_type = event.side_data.file_type().unwrap_or("unknown"),
            "File created"
        );
        Disposition::Acted
    }
}
