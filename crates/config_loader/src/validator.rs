//! Configuration validation
//!
//! Rules:
//! - field ranges declared on `CaptureConfig` (quality, geometry)
//! - the frame buffer fits in memory
//! - target_dir is not empty
//! - filename templates stay inside target_dir

use std::path::{Component, Path};

use contracts::{CaptureConfig, ContractError};
use validator::Validate;

/// Validate a CaptureConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &CaptureConfig) -> Result<(), ContractError> {
    validate_ranges(config)?;
    validate_frame_size(config)?;
    validate_target_dir(config)?;
    validate_template("jpeg_filename", config.jpeg_filename.as_deref())?;
    validate_template("snapshot_filename", config.snapshot_filename.as_deref())?;
    Ok(())
}

/// Field ranges declared through `#[validate]` attributes
fn validate_ranges(config: &CaptureConfig) -> Result<(), ContractError> {
    let Err(errors) = config.validate() else {
        return Ok(());
    };

    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    match fields.into_iter().next() {
        Some((field, errs)) => {
            let message = errs
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            Err(ContractError::config_validation(field.to_string(), message))
        }
        None => Err(ContractError::config_validation("config", errors.to_string())),
    }
}

fn validate_frame_size(config: &CaptureConfig) -> Result<(), ContractError> {
    config
        .geometry()
        .frame_len()
        .map(|_| ())
        .map_err(|e| ContractError::config_validation("geometry", e.to_string()))
}

fn validate_target_dir(config: &CaptureConfig) -> Result<(), ContractError> {
    if config.target_dir.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "target_dir",
            "target_dir cannot be empty",
        ));
    }
    Ok(())
}

/// Templates are joined onto target_dir, so they must be relative and must
/// not climb out of it. An absent or empty template is allowed.
fn validate_template(field: &str, template: Option<&str>) -> Result<(), ContractError> {
    let Some(template) = template.filter(|t| !t.is_empty()) else {
        return Ok(());
    };

    let path = Path::new(template);
    if path.is_absolute() {
        return Err(ContractError::config_validation(
            field,
            format!("template '{template}' must be relative to target_dir"),
        ));
    }
    if path.components().any(|c| c == Component::ParentDir) {
        return Err(ContractError::config_validation(
            field,
            format!("template '{template}' must not contain '..'"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_config() {
        assert!(validate(&CaptureConfig::default()).is_ok());
    }

    #[test]
    fn test_quality_out_of_range() {
        let config = CaptureConfig {
            quality: 101,
            ..CaptureConfig::default()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("quality"), "{err}");
    }

    #[test]
    fn test_zero_width() {
        let config = CaptureConfig {
            width: 0,
            ..CaptureConfig::default()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("width"), "{err}");
    }

    #[test]
    fn test_width_beyond_encoder_limit() {
        let config = CaptureConfig {
            width: 65536,
            ..CaptureConfig::default()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("width"), "{err}");
    }

    #[test]
    fn test_frame_too_large_for_memory() {
        let config = CaptureConfig {
            width: 65535,
            height: 65535,
            ..CaptureConfig::default()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("geometry"), "{err}");
    }

    #[test]
    fn test_empty_target_dir() {
        let config = CaptureConfig {
            target_dir: PathBuf::new(),
            ..CaptureConfig::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_absolute_template_rejected() {
        let config = CaptureConfig {
            jpeg_filename: Some("/etc/%Y".into()),
            ..CaptureConfig::default()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("jpeg_filename"));
    }

    #[test]
    fn test_parent_dir_template_rejected() {
        let config = CaptureConfig {
            snapshot_filename: Some("../%Y-snap".into()),
            ..CaptureConfig::default()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("snapshot_filename"));
    }

    #[test]
    fn test_cleared_template_allowed() {
        let config = CaptureConfig {
            jpeg_filename: Some(String::new()),
            snapshot_filename: None,
            ..CaptureConfig::default()
        };
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_lastsnap_allowed() {
        let config = CaptureConfig {
            snapshot_filename: Some("lastsnap".into()),
            ..CaptureConfig::default()
        };
        assert!(validate(&config).is_ok());
    }
}
