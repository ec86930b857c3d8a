//! Screenshot extraction.
//!
//! [`FrameExtractor`] runs `ffmpeg` once per timestamp and writes one
//! lossless PNG per run as `screenshot_001.png`, `screenshot_002.png`, ...
//! A failed extraction only affects its own index; the remaining
//! timestamps are still attempted.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use crate::progress::{NoOpProgress, OperationType, ProgressCallback, ProgressTracker};
use crate::timestamp::Timestamp;
use crate::tools::{run_captured, stderr_text};
use crate::workspace::file_size_kb;

/// File name of the screenshot with sequence number `index` (1-based).
pub fn screenshot_file_name(index: usize) -> String {
    format!("screenshot_{index:03}.png")
}

/// One extracted frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Screenshot {
    /// Sequence number, 1-based.
    pub index: usize,
    /// Where the frame was written.
    pub path: PathBuf,
    /// Position in the video.
    pub timestamp: Timestamp,
    /// File size in kilobytes.
    pub size_kb: f64,
    /// Pixel dimensions, when the PNG header could be read.
    pub dimensions: Option<(u32, u32)>,
}

/// Result of one extraction attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// The frame was written.
    Captured(Screenshot),
    /// The extractor failed for this timestamp.
    Failed {
        /// Sequence number, 1-based.
        index: usize,
        /// Position in the video.
        timestamp: Timestamp,
        /// Extractor error text.
        reason: String,
    },
}

/// Outcomes of an extraction stage, in sequence order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureReport {
    /// One entry per requested timestamp.
    pub outcomes: Vec<CaptureOutcome>,
}

impl CaptureReport {
    /// Successfully extracted screenshots.
    pub fn screenshots(&self) -> impl Iterator<Item = &Screenshot> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            CaptureOutcome::Captured(screenshot) => Some(screenshot),
            CaptureOutcome::Failed { .. } => None,
        })
    }

    /// Number of failed extractions.
    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, CaptureOutcome::Failed { .. }))
            .count()
    }

    /// Number of successful extractions.
    pub fn succeeded(&self) -> usize {
        self.outcomes.len() - self.failures()
    }
}

/// Frame extractor backed by an `ffmpeg` executable.
#[derive(Clone)]
pub struct FrameExtractor {
    program: PathBuf,
    progress: Arc<dyn ProgressCallback>,
}

impl Default for FrameExtractor {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FrameExtractor {
    /// Create an extractor that runs `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Extract one frame per timestamp into `output_dir`.
    ///
    /// The `i`-th timestamp (1-based) is written to
    /// [`screenshot_file_name(i)`](screenshot_file_name). Never fails as a
    /// whole; see [`CaptureReport`].
    pub fn capture(&self, video: &Path, timestamps: &[Timestamp], output_dir: &Path) -> CaptureReport {
        let mut tracker = ProgressTracker::new(
            Arc::clone(&self.progress),
            OperationType::FrameExtraction,
            Some(timestamps.len() as u64),
        );

        let outcomes = timestamps
            .iter()
            .enumerate()
            .map(|(offset, &timestamp)| {
                let outcome = self.capture_one(video, offset + 1, timestamp, output_dir);
                tracker.advance();
                outcome
            })
            .collect();

        tracker.finish();
        CaptureReport { outcomes }
    }

    fn capture_one(
        &self,
        video: &Path,
        index: usize,
        timestamp: Timestamp,
        output_dir: &Path,
    ) -> CaptureOutcome {
        let path = output_dir.join(screenshot_file_name(index));
        let failed = |reason: String| {
            log::debug!("Screenshot {index} at {timestamp} failed: {reason}");
            CaptureOutcome::Failed {
                index,
                timestamp,
                reason,
            }
        };

        let output = match run_captured(
            Command::new(&self.program)
                .arg("-ss")
                .arg(timestamp.to_string())
                .arg("-i")
                .arg(video)
                .args(["-frames:v", "1", "-qscale:v", "0", "-vsync", "vfr"])
                .arg(&path),
        ) {
            Ok(output) => output,
            Err(error) => return failed(format!("could not run {}: {error}", self.program.display())),
        };

        if !output.status.success() {
            return failed(stderr_text(&output));
        }

        let size_kb = match file_size_kb(&path) {
            Ok(size) => size,
            Err(_) => return failed(format!("no frame written at {timestamp}")),
        };

        CaptureOutcome::Captured(Screenshot {
            index,
            timestamp,
            size_kb,
            dimensions: image::image_dimensions(&path).ok(),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_zero_padded() {
        assert_eq!(screenshot_file_name(1), "screenshot_001.png");
        assert_eq!(screenshot_file_name(42), "screenshot_042.png");
        assert_eq!(screenshot_file_name(1000), "screenshot_1000.png");
    }

    #[test]
    fn report_counts() {
        let timestamp = Timestamp::from_seconds(300.0);
        let report = CaptureReport {
            outcomes: vec![
                CaptureOutcome::Captured(Screenshot {
                    index: 1,
                    path: PathBuf::from("screenshot_001.png"),
                    timestamp,
                    size_kb: 1.0,
                    dimensions: None,
                }),
                CaptureOutcome::Failed {
                    index: 2,
                    timestamp,
                    reason: "boom".to_string(),
                },
            ],
        };
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failures(), 1);
        assert_eq!(report.screenshots().next().unwrap().index, 1);
    }
}
