//! CLI argument definitions using clap.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};
use contracts::{ArtifactTag, EventKind, MovieKind, SideData};

/// Motion Events - raise capture events against a configured output tree
#[derive(Parser, Debug)]
#[command(
    name = "motion-events",
    author,
    version,
    about = "Motion capture event dispatcher",
    long_about = "Routes capture events (file created, image detected, motion mask, snapshot)\n\
                  to their handlers and writes the resulting images under the configured\n\
                  output directory."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "MOTION_EVENTS_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "MOTION_EVENTS_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", global = true, env = "MOTION_EVENTS_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration file
    Validate(ValidateArgs),

    /// Display resolved output settings
    Info(InfoArgs),

    /// Raise one event through the standard handlers
    Raise(RaiseArgs),
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "capture.toml", env = "MOTION_EVENTS_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "capture.toml", env = "MOTION_EVENTS_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `raise` command
#[derive(Parser, Debug, Clone)]
pub struct RaiseArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "capture.toml", env = "MOTION_EVENTS_CONFIG")]
    pub config: PathBuf,

    /// Event kinds to OR together
    #[arg(short, long, value_enum, value_delimiter = ',', required = true)]
    pub kind: Vec<KindArg>,

    /// Raw frame file matching the configured geometry (mid-gray if omitted)
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Raw motion-mask file (black if omitted)
    #[arg(long)]
    pub motion_mask: Option<PathBuf>,

    /// Filename carried by the event
    #[arg(long)]
    pub filename: Option<PathBuf>,

    /// File type carried by the event
    #[arg(long, value_enum)]
    pub file_type: Option<FileTypeArg>,

    /// Event time, e.g. 2024-01-02T03:04:05 (now if omitted)
    #[arg(long, value_parser = parse_timestamp)]
    pub time: Option<NaiveDateTime>,

    /// Episode number
    #[arg(long, default_value = "1")]
    pub event_nr: u64,

    /// Shot number within the second
    #[arg(long, default_value = "0")]
    pub shot: u32,

    /// Override the output directory from configuration
    #[arg(long, env = "MOTION_EVENTS_TARGET_DIR")]
    pub target_dir: Option<PathBuf>,

    /// Record writes instead of touching the filesystem
    #[arg(long)]
    pub dry_run: bool,
}

/// Event kind names accepted on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    FileCreate,
    Motion,
    FirstMotion,
    EndMotion,
    Stop,
    Timelapse,
    TimelapseEnd,
    Stream,
    ImageDetected,
    MotionMaskDetected,
    Snapshot,
    Image,
    MotionMask,
    FfmpegPut,
}

impl KindArg {
    pub fn to_kind(self) -> EventKind {
        match self {
            Self::FileCreate => EventKind::FILE_CREATE,
            Self::Motion => EventKind::MOTION,
            Self::FirstMotion => EventKind::FIRST_MOTION,
            Self::EndMotion => EventKind::END_MOTION,
            Self::Stop => EventKind::STOP,
            Self::Timelapse => EventKind::TIMELAPSE,
            Self::TimelapseEnd => EventKind::TIMELAPSE_END,
            Self::Stream => EventKind::STREAM,
            Self::ImageDetected => EventKind::IMAGE_DETECTED,
            Self::MotionMaskDetected => EventKind::IMAGEM_DETECTED,
            Self::Snapshot => EventKind::IMAGE_SNAPSHOT,
            Self::Image => EventKind::IMAGE,
            Self::MotionMask => EventKind::IMAGEM,
            Self::FfmpegPut => EventKind::FFMPEG_PUT,
        }
    }

    /// OR every requested kind together
    pub fn combine(kinds: &[KindArg]) -> EventKind {
        kinds
            .iter()
            .fold(EventKind::empty(), |acc, k| acc | k.to_kind())
    }
}

/// File types accepted on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileTypeArg {
    Image,
    MotionImage,
    Snapshot,
    Movie,
    MotionMovie,
    Timelapse,
}

impl FileTypeArg {
    pub fn to_side_data(self) -> SideData {
        match self {
            Self::Image => SideData::Picture(ArtifactTag::Image),
            Self::MotionImage => SideData::Picture(ArtifactTag::MotionImage),
            Self::Snapshot => SideData::Picture(ArtifactTag::Snapshot),
            Self::Movie => SideData::Movie(MovieKind::Normal),
            Self::MotionMovie => SideData::Movie(MovieKind::Motion),
            Self::Timelapse => SideData::Movie(MovieKind::Timelapse),
        }
    }
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map_err(|e| format!("expected YYYY-MM-DDTHH:MM:SS: {e}"))
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
