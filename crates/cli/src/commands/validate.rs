//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::CaptureConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    target_dir: String,
    image_ext: &'static str,
    snapshot_mode: &'static str,
    motion_img: bool,
    geometry: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    target_dir: config.target_dir.display().to_string(),
                    image_ext: config.image_ext(),
                    snapshot_mode: if config.snapshot_overwrites() {
                        "overwrite"
                    } else {
                        "timestamped"
                    },
                    motion_img: config.motion_img,
                    geometry: format!(
                        "{}x{} {:?}",
                        config.width, config.height, config.pixel_format
                    ),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &CaptureConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.jpeg_filename.as_deref().is_none_or(str::is_empty) {
        warnings.push("jpeg_filename is empty - the built-in default will be used".to_string());
    }
    if config.snapshot_filename.as_deref().is_none_or(str::is_empty) {
        warnings
            .push("snapshot_filename is empty - the built-in default will be used".to_string());
    }

    // Several detection images per second overwrite each other without %q
    if let Some(template) = config.jpeg_filename.as_deref() {
        if !template.is_empty() && !template.contains("%q") && !template.contains("%S") {
            warnings.push(format!(
                "jpeg_filename '{template}' has neither %S nor %q - images may overwrite each other"
            ));
        }
    }

    if config.ppm && config.quality != 75 {
        warnings.push("quality has no effect when ppm is enabled".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Target dir: {}", summary.target_dir);
            println!("  Extension: {}", summary.image_ext);
            println!("  Snapshots: {}", summary.snapshot_mode);
            println!("  Motion images: {}", summary.motion_img);
            println!("  Geometry: {}", summary.geometry);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_file_is_invalid() {
        let args = ValidateArgs {
            config: PathBuf::from("/nonexistent/capture.toml"),
            json: false,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }

    #[test]
    fn test_valid_file_has_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.toml");
        std::fs::write(&path, "snapshot_filename = \"lastsnap\"\nppm = true\n").unwrap();

        let result = validate_config(&ValidateArgs {
            config: path,
            json: true,
        });
        assert!(result.valid);
        let summary = result.summary.unwrap();
        assert_eq!(summary.image_ext, "ppm");
        assert_eq!(summary.snapshot_mode, "overwrite");
    }

    #[test]
    fn test_warns_on_cleared_template() {
        let config = CaptureConfig {
            jpeg_filename: Some(String::new()),
            ..CaptureConfig::default()
        };
        let warnings = collect_warnings(&config);
        assert!(warnings.iter().any(|w| w.contains("jpeg_filename")));
        assert!(collect_warnings(&CaptureConfig::default()).is_empty());
    }
}
