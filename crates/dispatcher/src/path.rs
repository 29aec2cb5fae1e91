//! Output path synthesis and latest-snapshot link maintenance

use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use contracts::{CaptureContext, ContractError, TimeFormatter};
use tracing::debug;

/// Basename of the stable latest-snapshot path
pub const LASTSNAP_STEM: &str = "lastsnap";

/// Pick the configured template, falling back to `default` when it was
/// removed or cleared at runtime.
pub fn resolve_template<'a>(configured: Option<&'a str>, default: &'a str) -> &'a str {
    match configured {
        Some(template) if !template.is_empty() => template,
        _ => default,
    }
}

/// Filename relative to `target_dir`: `<expanded><suffix>.<ext>`
pub fn artifact_name(
    formatter: &dyn TimeFormatter,
    ctx: &CaptureContext,
    template: &str,
    timestamp: &NaiveDateTime,
    suffix: &str,
    ext: &str,
) -> String {
    let stem = formatter.format(ctx, template, timestamp, None);
    format!("{stem}{suffix}.{ext}")
}

/// Full output path: `<target_dir>/<expanded>.<ext>`
///
/// Deterministic for identical template, timestamp, extension and context.
pub fn expand(
    formatter: &dyn TimeFormatter,
    ctx: &CaptureContext,
    template: &str,
    timestamp: &NaiveDateTime,
    ext: &str,
) -> PathBuf {
    ctx.config
        .target_dir
        .join(artifact_name(formatter, ctx, template, timestamp, "", ext))
}

/// `<target_dir>/lastsnap.<ext>`
pub fn lastsnap_path(ctx: &CaptureContext) -> PathBuf {
    ctx.config
        .target_dir
        .join(format!("{LASTSNAP_STEM}.{}", ctx.config.image_ext()))
}

/// Remove `path` if present. A missing file is not an error.
pub fn remove_if_exists(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Point `link_path` at `target_name`.
///
/// The old link is removed first; only creating the new one can fail. The
/// target is expected to be written already, so the link never dangles.
pub fn refresh_latest_link(target_name: &Path, link_path: &Path) -> Result<(), ContractError> {
    if let Err(e) = remove_if_exists(link_path) {
        debug!(link = %link_path.display(), error = %e, "Could not remove previous link");
    }

    create_symlink(target_name, link_path).map_err(|source| ContractError::Symlink {
        link: link_path.to_path_buf(),
        target: target_name.to_path_buf(),
        source,
    })
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::StrftimeFormatter;
    use chrono::NaiveDate;
    use contracts::CaptureConfig;
    use std::fs;
    use tempfile::tempdir;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    fn ctx_in(dir: &Path) -> CaptureContext {
        CaptureContext::new(CaptureConfig {
            target_dir: dir.to_path_buf(),
            ..CaptureConfig::default()
        })
    }

    #[test]
    fn test_resolve_template() {
        assert_eq!(resolve_template(Some("%Y"), "def"), "%Y");
        assert_eq!(resolve_template(Some(""), "def"), "def");
        assert_eq!(resolve_template(None, "def"), "def");
    }

    #[test]
    fn test_expand_concrete_path() {
        let mut ctx = ctx_in(Path::new("/var/cam"));
        ctx.shot = 7;

        let path = expand(&StrftimeFormatter, &ctx, "%Y%m%d/%H%M%S-%q", &ts(), "jpg");
        assert_eq!(path, Path::new("/var/cam/20240102/030405-07.jpg"));
    }

    #[test]
    fn test_expand_is_deterministic() {
        let ctx = ctx_in(Path::new("/var/cam"));
        let a = expand(&StrftimeFormatter, &ctx, "%v-%Y%m%d%H%M%S", &ts(), "ppm");
        let b = expand(&StrftimeFormatter, &ctx, "%v-%Y%m%d%H%M%S", &ts(), "ppm");
        assert_eq!(a, b);
    }

    #[test]
    fn test_artifact_name_suffix() {
        let ctx = ctx_in(Path::new("/var/cam"));
        let name = artifact_name(&StrftimeFormatter, &ctx, "%H%M%S", &ts(), "m", "jpg");
        assert_eq!(name, "030405m.jpg");
    }

    #[test]
    fn test_lastsnap_path_follows_ext() {
        let mut ctx = ctx_in(Path::new("/var/cam"));
        assert_eq!(lastsnap_path(&ctx), Path::new("/var/cam/lastsnap.jpg"));
        ctx.config.ppm = true;
        assert_eq!(lastsnap_path(&ctx), Path::new("/var/cam/lastsnap.ppm"));
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let dir = tempdir().unwrap();
        assert!(remove_if_exists(&dir.path().join("nope")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_refresh_latest_link_replaces_old_link() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"a").unwrap();
        fs::write(dir.path().join("b.jpg"), b"b").unwrap();
        let link = dir.path().join("lastsnap.jpg");

        refresh_latest_link(Path::new("a.jpg"), &link).unwrap();
        assert_eq!(fs::read(&link).unwrap(), b"a");

        refresh_latest_link(Path::new("b.jpg"), &link).unwrap();
        assert_eq!(fs::read_link(&link).unwrap(), Path::new("b.jpg"));
        assert_eq!(fs::read(&link).unwrap(), b"b");
        assert!(dir.path().join("a.jpg").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_refresh_latest_link_reports_failure() {
        let dir = tempdir().unwrap();
        let link = dir.path().join("lastsnap.jpg");
        fs::create_dir(&link).unwrap();
        fs::write(link.join("keep"), b"x").unwrap();

        let err = refresh_latest_link(Path::new("a.jpg"), &link).unwrap_err();
        assert!(matches!(err, ContractError::Symlink { .. }));
    }
}
