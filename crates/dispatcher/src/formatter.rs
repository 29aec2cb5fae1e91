//! StrftimeFormatter - capture tokens on top of chrono strftime
//!
//! | token | expands to |
//! |-------|------------|
//! | `%v`  | episode number, two digits minimum |
//! | `%q`  | shot number within the second, two digits minimum |
//! | `%t`  | camera thread number |
//! | `%C`  | user text event |
//! | `%f`  | filename argument, empty when absent |
//!
//! Everything else goes to chrono. A specifier chrono cannot render for a
//! naive timestamp (`%K`, `%-v`, `%z`) is kept literally and logged.

use std::fmt::Write;
use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;
use contracts::{CaptureContext, TimeFormatter};
use tracing::warn;

/// Flag, width and precision characters chrono accepts between `%` and the
/// conversion character
const SPECIFIER_MODIFIERS: &str = "-_0123456789.:#";

/// Default template formatter
#[derive(Debug, Clone, Copy, Default)]
pub struct StrftimeFormatter;

impl StrftimeFormatter {
    /// Replace capture tokens, leaving chrono specifiers untouched.
    ///
    /// Substituted text and unsupported specifiers have their `%` doubled so
    /// chrono emits them literally.
    fn expand_capture_tokens(
        ctx: &CaptureContext,
        template: &str,
        filename: Option<&Path>,
    ) -> String {
        let mut out = String::with_capacity(template.len() + 16);
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('v') => {
                    let _ = write!(out, "{:02}", ctx.episode.event_nr);
                }
                Some('q') => {
                    let _ = write!(out, "{:02}", ctx.shot);
                }
                Some('t') => {
                    let _ = write!(out, "{}", ctx.thread_nr);
                }
                Some('C') => push_escaped(&mut out, &ctx.text_event),
                Some('f') => {
                    if let Some(name) = filename {
                        push_escaped(&mut out, &name.to_string_lossy());
                    }
                }
                Some(first) => {
                    let mut spec = String::from('%');
                    spec.push(first);
                    if SPECIFIER_MODIFIERS.contains(first) {
                        while let Some(c) = chars.next_if(|&c| SPECIFIER_MODIFIERS.contains(c)) {
                            spec.push(c);
                        }
                        if let Some(c) = chars.next() {
                            spec.push(c);
                        }
                    }

                    if renders(&spec) {
                        out.push_str(&spec);
                    } else {
                        warn!(template, specifier = %spec, "Unsupported specifier kept literally");
                        push_escaped(&mut out, &spec);
                    }
                }
                // trailing lone '%'
                None => out.push_str("%%"),
            }
        }
        out
    }
}

/// Whether chrono can render `spec` for a naive timestamp
fn renders(spec: &str) -> bool {
    let items = StrftimeItems::new(spec);
    let mut sink = String::new();
    write!(sink, "{}", NaiveDateTime::default().format_with_items(items)).is_ok()
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
    }
}

impl TimeFormatter for StrftimeFormatter {
    fn format(
        &self,
        ctx: &CaptureContext,
        template: &str,
        timestamp: &NaiveDateTime,
        filename: Option<&Path>,
    ) -> String {
        let expanded = Self::expand_capture_tokens(ctx, template, filename);

        let items: Vec<Item<'_>> = StrftimeItems::new(&expanded).collect();
        let mut out = String::with_capacity(expanded.len() + 16);
        let rendered = !items.iter().any(|item| matches!(item, Item::Error))
            && write!(out, "{}", timestamp.format_with_items(items.iter())).is_ok();
        if rendered {
            out
        } else {
            warn!(template, "Template could not be rendered, using it unexpanded");
            expanded
        }
    }
}
