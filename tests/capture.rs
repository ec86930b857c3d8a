//! Frame extraction and compression tests.
//!
//! The external tools are stood in for by the Unix `true` and `false`
//! programs, so these tests only run on Unix.

#![cfg(unix)]

use std::fs;

use vidshot::{
    CaptureOutcome, CompressionLevel, CompressionOutcome, CompressorPool, FrameExtractor, Timestamp,
    compressed_file_name, screenshot_file_name,
};

fn timestamps(count: usize) -> Vec<Timestamp> {
    (0..count).map(|i| Timestamp::from_seconds(300.0 + i as f64)).collect()
}

// ── Extraction ─────────────────────────────────────────────────────

#[test]
fn failing_extractor_fails_every_index_independently() {
    let scratch = tempfile::tempdir().unwrap();
    let report = FrameExtractor::new("false").capture(
        &scratch.path().join("movie.mkv"),
        &timestamps(5),
        scratch.path(),
    );

    assert_eq!(report.outcomes.len(), 5);
    assert_eq!(report.failures(), 5);
    for (offset, outcome) in report.outcomes.iter().enumerate() {
        match outcome {
            CaptureOutcome::Failed { index, .. } => assert_eq!(*index, offset + 1),
            CaptureOutcome::Captured(_) => panic!("nothing should be captured"),
        }
    }
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn successful_exit_without_file_is_a_failure() {
    let scratch = tempfile::tempdir().unwrap();
    let report = FrameExtractor::new("true").capture(
        &scratch.path().join("movie.mkv"),
        &timestamps(2),
        scratch.path(),
    );

    assert_eq!(report.succeeded(), 0);
    assert!(matches!(
        &report.outcomes[1],
        CaptureOutcome::Failed { reason, .. } if reason.contains("no frame written")
    ));
}

#[test]
fn missing_extractor_is_reported_per_item() {
    let scratch = tempfile::tempdir().unwrap();
    let report = FrameExtractor::new("vidshot-missing-ffmpeg").capture(
        &scratch.path().join("movie.mkv"),
        &timestamps(3),
        scratch.path(),
    );
    assert_eq!(report.failures(), 3);
}

#[test]
fn empty_timestamp_list_does_nothing() {
    let scratch = tempfile::tempdir().unwrap();
    let report = FrameExtractor::new("false").capture(&scratch.path().join("movie.mkv"), &[], scratch.path());
    assert!(report.outcomes.is_empty());
}

// ── Compression ────────────────────────────────────────────────────

fn seed_screenshots(dir: &std::path::Path, count: usize) {
    for index in 1..=count {
        fs::write(dir.join(screenshot_file_name(index)), b"png").unwrap();
    }
}

#[test]
fn successful_compression_renames_with_level() {
    let scratch = tempfile::tempdir().unwrap();
    seed_screenshots(scratch.path(), 4);
    let level = CompressionLevel::new(3).unwrap();

    let report = CompressorPool::new("true", level, None).compress(scratch.path(), 4).unwrap();

    assert_eq!(report.compressed(), 4);
    assert_eq!(report.level, Some(level));
    let indices: Vec<usize> = report.outcomes.iter().map(CompressionOutcome::index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4]);
    assert!(scratch.path().join("screenshot_003_3.png").is_file());
    assert!(!scratch.path().join("screenshot_003.png").exists());
    assert_eq!(compressed_file_name(3, level), "screenshot_003_3.png");
}

#[test]
fn failed_compression_keeps_original_name() {
    let scratch = tempfile::tempdir().unwrap();
    seed_screenshots(scratch.path(), 3);
    let level = CompressionLevel::new(2).unwrap();

    let report = CompressorPool::new("false", level, Some(2)).compress(scratch.path(), 3).unwrap();

    assert_eq!(report.failures(), 3);
    for index in 1..=3 {
        assert!(scratch.path().join(screenshot_file_name(index)).is_file());
        assert!(!scratch.path().join(compressed_file_name(index, level)).exists());
    }
}

#[test]
fn serial_and_parallel_produce_the_same_files() {
    let level = CompressionLevel::new(1).unwrap();
    let mut listings = Vec::new();

    for workers in [Some(1), Some(3), None] {
        let scratch = tempfile::tempdir().unwrap();
        seed_screenshots(scratch.path(), 6);
        CompressorPool::new("true", level, workers).compress(scratch.path(), 6).unwrap();

        let mut names: Vec<String> = fs::read_dir(scratch.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        listings.push(names);
    }

    assert_eq!(listings[0], listings[1]);
    assert_eq!(listings[1], listings[2]);
    assert_eq!(listings[0].first().map(String::as_str), Some("screenshot_001_1.png"));
}

#[test]
fn missing_screenshot_does_not_stop_others() {
    let scratch = tempfile::tempdir().unwrap();
    fs::write(scratch.path().join(screenshot_file_name(1)), b"png").unwrap();
    fs::write(scratch.path().join(screenshot_file_name(3)), b"png").unwrap();
    let level = CompressionLevel::new(4).unwrap();

    let report = CompressorPool::new("true", level, Some(1)).compress(scratch.path(), 3).unwrap();

    assert_eq!(report.compressed(), 2);
    assert!(matches!(report.outcomes[1], CompressionOutcome::Failed { index: 2, .. }));
    assert!(scratch.path().join("screenshot_003_4.png").is_file());
}
