//! # Dispatcher
//!
//! Event dispatch module.
//!
//! Responsible for:
//! - Routing raised events to every handler whose interest overlaps the kind
//! - Synthesizing output paths from filename templates
//! - Keeping the latest-snapshot link consistent

pub mod dispatcher;
pub mod error;
pub mod formatter;
pub mod handlers;
pub mod metrics;
pub mod path;
pub mod sinks;

pub use contracts::{CaptureContext, Event, EventKind, PictureSink, SideData, TimeFormatter};
pub use dispatcher::{
    create_dispatcher, DispatcherBuilder, EventDispatcher, HandlerRegistration, SinkType,
};
pub use error::DispatcherError;
pub use formatter::StrftimeFormatter;
pub use handlers::{Disposition, EventHandler};
pub use metrics::{HandlerMetrics, MetricsSnapshot};
pub use sinks::{ImageFileSink, PictureWrite, RecordingSink};
