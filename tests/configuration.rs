//! Argument and option validation tests.

use std::path::Path;
use std::sync::Arc;

use vidshot::{
    CONFIRMATION_THRESHOLD, CompressionLevel, OperationType, ProgressCallback, ProgressInfo,
    RunOptions, ScreenshotCount, UploadOptions, VidshotError,
};

#[test]
fn screenshot_count_rejects_zero_negative_and_text() {
    for value in ["0", "-3", "abc", "", "2.5"] {
        assert!(
            matches!(ScreenshotCount::parse(value), Err(VidshotError::InvalidScreenshotCount(_))),
            "{value:?} was accepted"
        );
    }
    assert_eq!(ScreenshotCount::parse(" 12 ").unwrap().get(), 12);
}

#[test]
fn confirmation_starts_above_threshold() {
    let at = ScreenshotCount::parse(&CONFIRMATION_THRESHOLD.to_string()).unwrap();
    let above = ScreenshotCount::parse("51").unwrap();
    assert!(!at.needs_confirmation());
    assert!(above.needs_confirmation());
}

#[test]
fn compression_level_range() {
    for level in 1..=6u8 {
        assert_eq!(CompressionLevel::new(level).unwrap().get(), level);
    }
    assert!(CompressionLevel::new(0).is_err());
    assert!(CompressionLevel::new(7).is_err());

    let error = "9".parse::<CompressionLevel>().unwrap_err();
    assert!(error.to_string().contains("between 1 and 6"));
    assert!(matches!(
        "fast".parse::<CompressionLevel>(),
        Err(VidshotError::InvalidCompressionLevel(_))
    ));
}

#[test]
fn run_options_defaults() {
    let options = RunOptions::new(4);
    assert_eq!(options.count(), 4);
    assert_eq!(options.output_dir(), Path::new("screenshots"));
    assert_eq!(options.compression(), None);
    assert_eq!(options.workers(), None);
    assert_eq!(options.upload(), Some(&UploadOptions::default()));
}

#[test]
fn run_options_builders() {
    struct Silent;
    impl ProgressCallback for Silent {
        fn on_progress(&self, info: &ProgressInfo) {
            assert_ne!(info.operation, OperationType::Upload);
        }
    }

    let options = RunOptions::new(2)
        .with_output_dir("shots")
        .with_compression(CompressionLevel::new(3).unwrap())
        .with_workers(Some(0))
        .with_upload(None)
        .with_progress(Arc::new(Silent));

    assert_eq!(options.output_dir(), Path::new("shots"));
    assert_eq!(options.compression().map(CompressionLevel::get), Some(3));
    assert_eq!(options.workers(), None, "zero workers means default");
    assert!(options.upload().is_none());
    assert!(format!("{options:?}").contains("shots"));
}

#[test]
fn upload_defaults_match_pixhost() {
    let upload = UploadOptions::default();
    assert_eq!(upload.endpoint, "https://api.pixhost.to/images");
    assert_eq!(upload.content_type, "0");
    assert_eq!(upload.thumbnail_size, 420);
}
