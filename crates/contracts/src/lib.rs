//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Events carry a local wall-clock `chrono::NaiveDateTime`
//! - Episodes are numbered by the host; see [`EpisodeTracker`]

mod config;
mod context;
mod error;
mod event;
mod formatter;
mod sink;

pub use config::*;
pub use context::*;
pub use error::*;
pub use event::*;
pub use formatter::TimeFormatter;
pub use sink::PictureSink;
