//! # Integration Tests
//!
//! Cross-crate tests.
//!
//! Covers:
//! - Contract sanity checks
//! - Config file to written images, end to end
//! - Snapshot link behaviour across repeated events

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::EventKind::IMAGE_SNAPSHOT;
        assert_eq!(contracts::EventKind::all().bits(), (1 << 14) - 1);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::path::Path;

    use chrono::{NaiveDate, NaiveDateTime};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{CaptureConfig, CaptureContext, Event, EventKind, SideData};
    use dispatcher::{create_dispatcher, EventDispatcher, SinkType};
    use observability::DispatchTally;
    use tempfile::tempdir;

    const JPEG_MAGIC: [u8; 2] = [0xFF, 0xD8];

    fn ts(sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, sec)
            .unwrap()
    }

    fn load(dir: &Path, extra: &str) -> CaptureConfig {
        let toml = format!(
            "target_dir = {:?}\nwidth = 8\nheight = 4\n{extra}",
            dir.display().to_string()
        );
        ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap()
    }

    fn setup(dir: &Path, extra: &str) -> (EventDispatcher, CaptureContext) {
        let config = load(dir, extra);
        let dispatcher = create_dispatcher(&config, SinkType::File).unwrap();
        let mut ctx = CaptureContext::new(config);
        ctx.episode.begin();
        (dispatcher, ctx)
    }

    fn frame(ctx: &CaptureContext, level: u8) -> Vec<u8> {
        vec![level; ctx.config.geometry().frame_len().unwrap()]
    }

    /// One compound event writes the detection image, its mask and a snapshot
    #[cfg(unix)]
    #[test]
    fn test_e2e_compound_event() {
        let dir = tempdir().unwrap();
        let (dispatcher, mut ctx) = setup(
            dir.path(),
            "jpeg_filename = \"%Y%m%d/%H%M%S-%q\"\n\
             snapshot_filename = \"snap-%H%M%S\"\n\
             motion_img = true\n",
        );
        ctx.snapshot_pending = true;
        let image = frame(&ctx, 200);

        let kind =
            EventKind::IMAGE_DETECTED | EventKind::IMAGEM_DETECTED | EventKind::IMAGE_SNAPSHOT;
        let mut tally = DispatchTally::new();
        tally.update(kind);
        dispatcher.dispatch(&mut ctx, &Event::new(kind, ts(5)).with_image(&image));

        let detection = dir.path().join("20240102/030405-00.jpg");
        let mask = dir.path().join("20240102/030405-00m.jpg");
        let snapshot = dir.path().join("snap-030405.jpg");
        for path in [&detection, &mask, &snapshot] {
            assert_eq!(&fs::read(path).unwrap()[..2], &JPEG_MAGIC, "{}", path.display());
        }

        let link = dir.path().join("lastsnap.jpg");
        assert_eq!(fs::read_link(&link).unwrap(), Path::new("snap-030405.jpg"));
        assert!(!ctx.snapshot_pending);
        assert!(!ctx.episode.is_new());

        let fired: Vec<_> = dispatcher
            .metrics()
            .into_iter()
            .filter(|(_, m)| m.invocation_count > 0)
            .map(|(name, m)| (name, m.acted_count))
            .collect();
        assert_eq!(
            fired,
            vec![
                ("image_detected".to_string(), 1),
                ("motion_mask_detected".to_string(), 1),
                ("image_snapshot".to_string(), 1),
            ]
        );
        assert_eq!(tally.count("IMAGE_SNAPSHOT"), 1);
    }

    /// A second detection in the same episode writes nothing
    #[test]
    fn test_e2e_one_image_per_episode() {
        let dir = tempdir().unwrap();
        let (dispatcher, mut ctx) = setup(dir.path(), "jpeg_filename = \"%v-%S\"\n");
        let image = frame(&ctx, 90);

        for sec in [1, 2] {
            let event = Event::new(EventKind::IMAGE_DETECTED, ts(sec)).with_image(&image);
            dispatcher.dispatch(&mut ctx, &event);
        }
        assert!(dir.path().join("01-01.jpg").exists());
        assert!(!dir.path().join("01-02.jpg").exists());

        ctx.episode.begin();
        let event = Event::new(EventKind::IMAGE_DETECTED, ts(3)).with_image(&image);
        dispatcher.dispatch(&mut ctx, &event);
        assert!(dir.path().join("02-03.jpg").exists());

        let (_, detected) = &dispatcher.metrics()[1];
        assert_eq!(detected.acted_count, 2);
        assert_eq!(detected.skipped_count, 1);
    }

    /// Overwrite mode keeps exactly one regular PPM file
    #[test]
    fn test_e2e_overwrite_snapshot_ppm() {
        let dir = tempdir().unwrap();
        let (dispatcher, mut ctx) = setup(
            dir.path(),
            "snapshot_filename = \"lastsnap\"\nppm = true\n",
        );

        for (sec, level) in [(1, 10), (2, 20), (3, 30)] {
            let image = frame(&ctx, level);
            ctx.snapshot_pending = true;
            dispatcher.raise(
                &mut ctx,
                EventKind::IMAGE_SNAPSHOT,
                Some(image.as_slice()),
                None,
                SideData::None,
                ts(sec),
            );
            assert!(!ctx.snapshot_pending);
        }

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let lastsnap = dir.path().join("lastsnap.ppm");
        let bytes = fs::read(&lastsnap).unwrap();
        assert_eq!(&bytes[..2], b"P6");
        assert_eq!(*bytes.last().unwrap(), 30);
        assert!(!fs::symlink_metadata(&lastsnap).unwrap().is_symlink());
    }

    /// Mask writing is gated by `motion_img`, and kinds nobody handles are no-ops
    #[test]
    fn test_e2e_gated_and_unhandled_kinds() {
        let dir = tempdir().unwrap();
        let (dispatcher, mut ctx) = setup(dir.path(), "");
        let image = frame(&ctx, 1);

        let kind = EventKind::IMAGEM_DETECTED | EventKind::MOTION | EventKind::STOP;
        dispatcher.dispatch(&mut ctx, &Event::new(kind, ts(1)).with_image(&image));
        dispatcher.dispatch(&mut ctx, &Event::new(EventKind::empty(), ts(2)));

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
        let (name, mask) = &dispatcher.metrics()[2];
        assert_eq!(name, "motion_mask_detected");
        assert_eq!(mask.skipped_count, 1);
    }

    /// Wrong-sized frames abort the handler without leaving partial files
    #[test]
    fn test_e2e_bad_frame_size() {
        let dir = tempdir().unwrap();
        let (dispatcher, mut ctx) = setup(dir.path(), "jpeg_filename = \"bad\"\n");

        let event = Event::new(EventKind::IMAGE_DETECTED, ts(1)).with_image(&[0u8; 3]);
        dispatcher.dispatch(&mut ctx, &event);

        assert!(!dir.path().join("bad.jpg").exists());
        assert!(ctx.episode.is_new());
        assert_eq!(dispatcher.metrics()[1].1.aborted_count, 1);
    }

    #[test]
    fn test_e2e_file_created_is_logged_only() {
        let dir = tempdir().unwrap();
        let (dispatcher, mut ctx) = setup(dir.path(), "");

        let movie = dir.path().join("01-20240102030405.avi");
        let event = Event::new(EventKind::FILE_CREATE, ts(1))
            .with_filename(&movie)
            .with_side_data(SideData::Movie(contracts::MovieKind::Normal));
        dispatcher.dispatch(&mut ctx, &event);

        assert_eq!(dispatcher.metrics()[0].1.acted_count, 1);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
