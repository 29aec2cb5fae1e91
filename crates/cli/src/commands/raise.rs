//! `raise` command implementation.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use contracts::{CaptureConfig, CaptureContext, EventKind, SideData};
use dispatcher::{
    create_dispatcher, EventDispatcher, RecordingSink, SinkType, StrftimeFormatter,
};
use tracing::{info, warn};

use crate::cli::{KindArg, RaiseArgs};

/// Gray level used when no frame file is given
const PLACEHOLDER_LEVEL: u8 = 128;

/// Execute the `raise` command
pub fn run_raise(args: &RaiseArgs) -> Result<()> {
    let mut config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if let Some(ref target_dir) = args.target_dir {
        info!(target_dir = %target_dir.display(), "Overriding output directory");
        config.target_dir = target_dir.clone();
    }

    let kind = KindArg::combine(&args.kind);
    let frame_len = config
        .geometry()
        .frame_len()
        .context("Invalid frame geometry")?;
    let frame = load_frame(args.image.as_deref(), frame_len, PLACEHOLDER_LEVEL)?;
    let mask = load_frame(args.motion_mask.as_deref(), frame_len, 0)?;

    let mut ctx = build_context(config, args, kind, mask);
    let timestamp = args.time.unwrap_or_else(|| Local::now().naive_local());
    let side_data = args
        .file_type
        .map(|t| t.to_side_data())
        .unwrap_or(SideData::None);

    info!(
        kind = %kind,
        event_nr = ctx.episode.event_nr,
        dry_run = args.dry_run,
        "Raising event"
    );

    let recorder = args
        .dry_run
        .then(|| Arc::new(RecordingSink::new("dry_run")));
    let dispatcher = match recorder {
        Some(ref sink) => EventDispatcher::standard(sink.clone(), Arc::new(StrftimeFormatter)),
        None => create_dispatcher(&ctx.config, SinkType::File)
            .context("Failed to create dispatcher")?,
    };

    observability::record_event_raised(kind);
    dispatcher.raise(
        &mut ctx,
        kind,
        Some(frame.as_slice()),
        args.filename.as_deref(),
        side_data,
        timestamp,
    );

    let mut any_aborted = false;
    println!("Handlers for {}:", kind);
    for (name, snapshot) in dispatcher.metrics() {
        if snapshot.invocation_count == 0 {
            continue;
        }
        observability::record_handler_outcomes(
            &name,
            snapshot.acted_count,
            snapshot.skipped_count,
            snapshot.aborted_count,
        );
        let outcome = if snapshot.aborted_count > 0 {
            any_aborted = true;
            "aborted"
        } else if snapshot.acted_count > 0 {
            "acted"
        } else {
            "skipped"
        };
        println!("  {name}: {outcome}");
    }

    if let Some(sink) = recorder {
        println!("\nPlanned writes:");
        for write in sink.writes() {
            println!("  [{}] {} ({} bytes)", write.tag, write.path.display(), write.data.len());
        }
    }

    if any_aborted {
        warn!("At least one handler aborted, see log for details");
    }
    Ok(())
}

/// Read a raw frame, or synthesise a flat one of `len` bytes
fn load_frame(path: Option<&Path>, len: usize, fill: u8) -> Result<Vec<u8>> {
    let Some(path) = path else {
        return Ok(vec![fill; len]);
    };

    let data =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if data.len() != len {
        anyhow::bail!(
            "{} holds {} bytes, configured geometry needs {}",
            path.display(),
            data.len(),
            len
        );
    }
    Ok(data)
}

fn build_context(
    config: CaptureConfig,
    args: &RaiseArgs,
    kind: EventKind,
    mask: Vec<u8>,
) -> CaptureContext {
    let mut ctx = CaptureContext::new(config);
    ctx.motion_mask = mask;
    ctx.episode.event_nr = args.event_nr;
    ctx.shot = args.shot;
    ctx.snapshot_pending = kind.contains(EventKind::IMAGE_SNAPSHOT);
    ctx
}
