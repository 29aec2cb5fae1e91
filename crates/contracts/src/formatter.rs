//! TimeFormatter trait - timestamp template expansion
//!
//! Format tokens are opaque to the handlers; they only hand templates over.

use std::path::Path;

use chrono::NaiveDateTime;

use crate::CaptureContext;

/// Expands a filename template against a timestamp.
///
/// Must be pure: identical inputs yield identical output.
pub trait TimeFormatter: Send + Sync {
    fn format(
        &self,
        ctx: &CaptureContext,
        template: &str,
        timestamp: &NaiveDateTime,
        filename: Option<&Path>,
    ) -> String;
}
