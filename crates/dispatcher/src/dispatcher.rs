//! EventDispatcher - routes raised events to interested handlers

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDateTime;
use contracts::{
    CaptureConfig, CaptureContext, Event, EventKind, PictureSink, SideData, TimeFormatter,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::error::DispatcherError;
use crate::formatter::StrftimeFormatter;
use crate::handlers::{
    Disposition, EventHandler, FileCreatedHandler, ImageDetectedHandler, MotionMaskHandler,
    SnapshotHandler,
};
use crate::metrics::{HandlerMetrics, MetricsSnapshot};
use crate::sinks::{ImageFileSink, RecordingSink};

/// One row of the handler table
pub struct HandlerRegistration {
    interest: EventKind,
    handler: Box<dyn EventHandler>,
    metrics: HandlerMetrics,
}

impl HandlerRegistration {
    pub fn new(interest: EventKind, handler: Box<dyn EventHandler>) -> Self {
        Self {
            interest,
            handler,
            metrics: HandlerMetrics::new(),
        }
    }

    pub fn interest(&self) -> EventKind {
        self.interest
    }

    pub fn name(&self) -> &str {
        self.handler.name()
    }

    /// An empty interest never matches.
    pub fn matches(&self, kind: EventKind) -> bool {
        self.interest.intersects(kind)
    }

    pub fn metrics(&self) -> &HandlerMetrics {
        &self.metrics
    }
}

/// Builder for creating an EventDispatcher
#[derive(Default)]
pub struct DispatcherBuilder {
    registrations: Vec<HandlerRegistration>,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder with an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler. Table order is dispatch order.
    pub fn register(mut self, interest: EventKind, handler: impl EventHandler + 'static) -> Self {
        if interest.is_empty() {
            warn!(handler = handler.name(), "Registered with empty interest, will never fire");
        }
        self.registrations
            .push(HandlerRegistration::new(interest, Box::new(handler)));
        self
    }

    /// Append the four capture handlers in their fixed order
    pub fn with_standard_handlers(
        self,
        sink: Arc<dyn PictureSink>,
        formatter: Arc<dyn TimeFormatter>,
    ) -> Self {
        self.register(EventKind::FILE_CREATE, FileCreatedHandler)
            .register(
                EventKind::IMAGE_DETECTED,
                ImageDetectedHandler::new(Arc::clone(&sink), Arc::clone(&formatter)),
            )
            .register(
                EventKind::IMAGEM_DETECTED,
                MotionMaskHandler::new(Arc::clone(&sink), Arc::clone(&formatter)),
            )
            .register(
                EventKind::IMAGE_SNAPSHOT,
                SnapshotHandler::new(sink, formatter),
            )
    }

    /// Freeze the table
    pub fn build(self) -> EventDispatcher {
        debug!(handlers = self.registrations.len(), "Dispatcher built");
        EventDispatcher {
            registrations: self.registrations,
        }
    }
}

/// Immutable, ordered handler table
///
/// Dispatch is synchronous: every matching handler has returned before
/// [`dispatch`](Self::dispatch) does. Handler failures never surface here.
pub struct EventDispatcher {
    registrations: Vec<HandlerRegistration>,
}

impl EventDispatcher {
    /// Dispatcher wired with the standard handlers
    pub fn standard(sink: Arc<dyn PictureSink>, formatter: Arc<dyn TimeFormatter>) -> Self {
        DispatcherBuilder::new()
            .with_standard_handlers(sink, formatter)
            .build()
    }

    /// Create a dispatcher with custom registrations (for testing)
    pub fn with_registrations(registrations: Vec<HandlerRegistration>) -> Self {
        Self { registrations }
    }

    pub fn registrations(&self) -> &[HandlerRegistration] {
        &self.registrations
    }

    /// Get metrics for all handlers, in table order
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.registrations
            .iter()
            .map(|r| (r.name().to_string(), r.metrics.snapshot()))
            .collect()
    }

    /// Invoke every handler whose interest intersects `event.kind`, in
    /// registration order, each with the unfiltered event.
    #[instrument(
        name = "dispatcher_dispatch",
        skip(self, ctx, event),
        fields(kind = %event.kind, event_nr = ctx.episode.event_nr)
    )]
    pub fn dispatch(&self, ctx: &mut CaptureContext, event: &Event<'_>) {
        let mut matched = 0usize;

        for registration in &self.registrations {
            if !registration.matches(event.kind) {
                continue;
            }
            matched += 1;
            registration.metrics.inc_invocation_count();

            let disposition = registration.handler.handle(ctx, event);
            match disposition {
                Disposition::Acted => registration.metrics.inc_acted_count(),
                Disposition::Skipped => registration.metrics.inc_skipped_count(),
                Disposition::Aborted => registration.metrics.inc_aborted_count(),
            }
            trace!(handler = registration.name(), ?disposition, "Handler returned");
        }

        if matched == 0 {
            trace!("No handler registered for kind");
        }
    }

    /// Field-wise form of [`dispatch`](Self::dispatch)
    pub fn raise(
        &self,
        ctx: &mut CaptureContext,
        kind: EventKind,
        image: Option<&[u8]>,
        filename: Option<&Path>,
        side_data: SideData,
        timestamp: NaiveDateTime,
    ) {
        let event = Event {
            kind,
            image,
            filename,
            side_data,
            timestamp,
        };
        self.dispatch(ctx, &event);
    }
}

/// Persistence backend for [`create_dispatcher`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkType {
    /// Encode to JPEG/PPM under `target_dir`
    File,
    /// Keep writes in memory only
    Recording,
}

/// Convenience function to create the standard dispatcher from configuration
#[instrument(
    name = "dispatcher_create",
    skip(config),
    fields(target_dir = %config.target_dir.display())
)]
pub fn create_dispatcher(
    config: &CaptureConfig,
    sink_type: SinkType,
) -> Result<EventDispatcher, DispatcherError> {
    let geometry = config.geometry();
    if geometry.frame_len()? == 0 {
        return Err(DispatcherError::EmptyFrame {
            width: geometry.width,
            height: geometry.height,
        });
    }

    let sink: Arc<dyn PictureSink> = match sink_type {
        SinkType::File => Arc::new(
            ImageFileSink::new("image_file", &config.target_dir)
                .map_err(|e| DispatcherError::target_dir(&config.target_dir, e))?,
        ),
        SinkType::Recording => Arc::new(RecordingSink::new("recording")),
    };

    info!(sink = sink.name(), ext = config.image_ext(), "Creating dispatcher");
    Ok(EventDispatcher::standard(sink, Arc::new(StrftimeFormatter)))
}
