//! `info` command implementation.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use contracts::{
    CaptureConfig, CaptureContext, DEFAULT_JPEG_FILENAME, DEFAULT_SNAPSHOT_FILENAME,
};
use dispatcher::path;
use dispatcher::StrftimeFormatter;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Resolved output settings for JSON output
#[derive(Serialize)]
struct OutputInfo {
    target_dir: String,
    image_ext: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<u8>,
    geometry: GeometryInfo,
    detection: TemplateInfo,
    snapshot: SnapshotInfo,
}

#[derive(Serialize)]
struct GeometryInfo {
    width: u32,
    height: u32,
    pixel_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame_len: Option<usize>,
}

#[derive(Serialize)]
struct TemplateInfo {
    template: String,
    default_used: bool,
    example: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    motion_example: Option<String>,
}

#[derive(Serialize)]
struct SnapshotInfo {
    mode: &'static str,
    template: String,
    example: String,
    lastsnap: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = build_output_info(config, Local::now().naive_local());
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_output_info(&info);
    }

    Ok(())
}

/// Resolve templates and expand them once at `now` to show real filenames
fn build_output_info(config: CaptureConfig, now: NaiveDateTime) -> OutputInfo {
    let ctx = CaptureContext::new(config);
    let config = &ctx.config;
    let ext = config.image_ext();
    let formatter = StrftimeFormatter;

    let jpeg_template =
        path::resolve_template(config.jpeg_filename.as_deref(), DEFAULT_JPEG_FILENAME);
    let example_in_dir = |name: String| config.target_dir.join(name).display().to_string();

    let detection = TemplateInfo {
        template: jpeg_template.to_string(),
        default_used: jpeg_template == DEFAULT_JPEG_FILENAME,
        example: example_in_dir(path::artifact_name(
            &formatter,
            &ctx,
            jpeg_template,
            &now,
            "",
            ext,
        )),
        motion_example: config.motion_img.then(|| {
            example_in_dir(path::artifact_name(
                &formatter,
                &ctx,
                jpeg_template,
                &now,
                "m",
                ext,
            ))
        }),
    };

    let lastsnap = path::lastsnap_path(&ctx).display().to_string();
    let snapshot = if config.snapshot_overwrites() {
        SnapshotInfo {
            mode: "overwrite",
            template: contracts::LASTSNAP.to_string(),
            example: lastsnap.clone(),
            lastsnap,
        }
    } else {
        let template = path::resolve_template(
            config.snapshot_filename.as_deref(),
            DEFAULT_SNAPSHOT_FILENAME,
        );
        SnapshotInfo {
            mode: "timestamped",
            template: template.to_string(),
            example: example_in_dir(path::artifact_name(
                &formatter, &ctx, template, &now, "", ext,
            )),
            lastsnap,
        }
    };

    let geometry = config.geometry();
    OutputInfo {
        target_dir: config.target_dir.display().to_string(),
        image_ext: ext,
        quality: (!config.ppm).then_some(config.quality),
        geometry: GeometryInfo {
            width: geometry.width,
            height: geometry.height,
            pixel_format: format!("{:?}", geometry.format),
            frame_len: geometry.frame_len().ok(),
        },
        detection,
        snapshot,
    }
}

fn print_output_info(info: &OutputInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Motion Events Output Settings                  ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📁 Output");
    println!("   ├─ Target dir: {}", info.target_dir);
    match info.quality {
        Some(quality) => println!("   ├─ Format: {} (quality {})", info.image_ext, quality),
        None => println!("   ├─ Format: {}", info.image_ext),
    }
    let frame_bytes = info
        .geometry
        .frame_len
        .map_or_else(|| "too large".to_string(), |len| format!("{len} bytes"));
    println!(
        "   └─ Frame: {}x{} {} ({})",
        info.geometry.width, info.geometry.height, info.geometry.pixel_format, frame_bytes
    );

    let detection = &info.detection;
    println!("\n🎯 Detection images");
    if detection.default_used {
        println!("   ├─ Template: {} (default)", detection.template);
    } else {
        println!("   ├─ Template: {}", detection.template);
    }
    match detection.motion_example {
        Some(ref motion) => {
            println!("   ├─ Example: {}", detection.example);
            println!("   └─ Motion image: {}", motion);
        }
        None => {
            println!("   ├─ Example: {}", detection.example);
            println!("   └─ Motion image: disabled");
        }
    }

    let snapshot = &info.snapshot;
    println!("\n📸 Snapshots");
    println!("   ├─ Mode: {}", snapshot.mode);
    println!("   ├─ Template: {}", snapshot.template);
    println!("   ├─ Example: {}", snapshot.example);
    println!("   └─ Latest: {}", snapshot.lastsnap);

    println!();
}
