//! Progress reporting.
//!
//! This module provides [`ProgressCallback`] for monitoring the pipeline
//! stages and [`ProgressInfo`] for detailed progress snapshots.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use vidshot::{ProgressCallback, ProgressInfo, RunOptions};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("[{:?}] {pct:.1}% complete", info.operation);
//!         }
//!     }
//! }
//!
//! let options = RunOptions::new(5).with_progress(Arc::new(PrintProgress));
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// The pipeline stage currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Extracting screenshots with the frame extractor.
    FrameExtraction,
    /// Compressing screenshots with the PNG compressor.
    Compression,
    /// Uploading screenshots to the image host.
    Upload,
}

/// A snapshot of stage progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Which stage is running.
    pub operation: OperationType,
    /// How many items have been processed so far (successful or not).
    pub current: u64,
    /// Total items expected, if known ahead of time.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the stage started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
}

/// Trait for receiving progress updates.
///
/// Implementations must be [`Send`] and [`Sync`] because the compression
/// stage reports from worker threads.
///
/// Progress callbacks are **infallible**: they observe but cannot halt
/// the run.
pub trait ProgressCallback: Send + Sync {
    /// Called after each processed item and once more when a stage ends.
    fn on_progress(&self, info: &ProgressInfo);
}

/// A no-op implementation that discards all progress notifications.
///
/// This is the default when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Internal helper that tracks progress timing and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one completed item and fire the callback.
    pub(crate) fn advance(&mut self) {
        self.current += 1;
        self.report();
    }

    /// Unconditionally emit a final progress report.
    pub(crate) fn finish(&mut self) {
        self.report();
    }

    fn report(&self) {
        let elapsed = self.start_time.elapsed();

        let percentage = self
            .total
            .filter(|&t| t > 0)
            .map(|t| (self.current as f32 / t as f32) * 100.0);

        let estimated_remaining = if self.current > 0 {
            self.total.map(|t| {
                let remaining = t.saturating_sub(self.current);
                let per_item = elapsed / self.current as u32;
                per_item * remaining as u32
            })
        } else {
            None
        };

        let info = ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
        };

        self.callback.on_progress(&info);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(u64, Option<f32>)>>);

    impl ProgressCallback for Recorder {
        fn on_progress(&self, info: &ProgressInfo) {
            self.0.lock().unwrap().push((info.current, info.percentage));
        }
    }

    #[test]
    fn tracker_reports_every_item_and_finish() {
        let recorder = Arc::new(Recorder::default());
        let mut tracker = ProgressTracker::new(recorder.clone(), OperationType::Upload, Some(4));
        tracker.advance();
        tracker.advance();
        tracker.finish();

        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], (1, Some(25.0)));
        assert_eq!(seen[1], (2, Some(50.0)));
        assert_eq!(seen[2].0, 2);
    }

    #[test]
    fn unknown_total_has_no_percentage() {
        let recorder = Arc::new(Recorder::default());
        let mut tracker = ProgressTracker::new(recorder.clone(), OperationType::Upload, None);
        tracker.advance();
        assert_eq!(recorder.0.lock().unwrap()[0], (1, None));
    }
}
