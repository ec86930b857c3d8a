//! Parallel PNG compression.
//!
//! [`CompressorPool`] runs `oxipng` over the numbered screenshots on a
//! dedicated [`rayon`] pool. Each task owns exactly one input file and one
//! output name, so workers share nothing but the directory.
//!
//! The pool size is an `Option<usize>`: `None` leaves it to rayon (one
//! thread per logical CPU), `Some(1)` compresses strictly one file at a
//! time, and `Some(k)` allows at most `k` concurrent compressor processes.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};

use rayon::ThreadPoolBuilder;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::capture::screenshot_file_name;
use crate::configuration::CompressionLevel;
use crate::error::VidshotError;
use crate::progress::{NoOpProgress, OperationType, ProgressCallback, ProgressTracker};
use crate::tools::{run_captured, stderr_text};
use crate::workspace::file_size_kb;

/// File name of screenshot `index` after compression at `level`.
pub fn compressed_file_name(index: usize, level: CompressionLevel) -> String {
    format!("screenshot_{index:03}_{level}.png")
}

/// How the pool schedules work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    /// One file at a time.
    Serial,
    /// Several files at once, optionally bounded.
    Parallel(Option<usize>),
}

/// Result of compressing one screenshot.
#[derive(Debug, Clone, PartialEq)]
pub enum CompressionOutcome {
    /// The file was compressed and renamed.
    Compressed {
        /// Sequence number, 1-based.
        index: usize,
        /// New location of the file.
        path: PathBuf,
        /// Size after compression, in kilobytes.
        size_kb: f64,
    },
    /// The file was left untouched under its original name.
    Failed {
        /// Sequence number, 1-based.
        index: usize,
        /// File the compressor was asked to process.
        path: PathBuf,
        /// Compressor error text.
        reason: String,
    },
}

impl CompressionOutcome {
    /// Sequence number of the screenshot.
    pub fn index(&self) -> usize {
        match self {
            CompressionOutcome::Compressed { index, .. } | CompressionOutcome::Failed { index, .. } => {
                *index
            }
        }
    }
}

/// Outcomes of a compression stage, sorted by sequence number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompressionReport {
    /// Level every file was compressed at.
    pub level: Option<CompressionLevel>,
    /// One entry per screenshot index.
    pub outcomes: Vec<CompressionOutcome>,
}

impl CompressionReport {
    /// Number of files that were compressed.
    pub fn compressed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, CompressionOutcome::Compressed { .. }))
            .count()
    }

    /// Number of files left as they were.
    pub fn failures(&self) -> usize {
        self.outcomes.len() - self.compressed()
    }
}

/// Bounded pool of compressor processes.
#[derive(Clone)]
pub struct CompressorPool {
    program: PathBuf,
    level: CompressionLevel,
    workers: Option<usize>,
    progress: Arc<dyn ProgressCallback>,
}

impl CompressorPool {
    /// Create a pool running `program` at `level` with at most `workers`
    /// threads (`None` = rayon default). `Some(0)` is treated as `None`.
    pub fn new(program: impl Into<PathBuf>, level: CompressionLevel, workers: Option<usize>) -> Self {
        Self {
            program: program.into(),
            level,
            workers: workers.filter(|&count| count > 0),
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// How this pool schedules work.
    pub fn mode(&self) -> CompressionMode {
        match self.workers {
            Some(1) => CompressionMode::Serial,
            other => CompressionMode::Parallel(other),
        }
    }

    /// Compress `screenshot_001.png` ..= `screenshot_{count}.png` in
    /// `output_dir`.
    ///
    /// # Errors
    ///
    /// Only fails if the thread pool cannot be built; per-file failures
    /// are reported in the [`CompressionReport`].
    pub fn compress(&self, output_dir: &Path, count: usize) -> Result<CompressionReport, VidshotError> {
        // rayon treats 0 threads as "pick the default".
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers.unwrap_or(0))
            .thread_name(|index| format!("vidshot-compress-{index}"))
            .build()
            .map_err(|error| VidshotError::IoError(std::io::Error::other(error)))?;
        log::debug!(
            "Compressing {count} screenshots at level {} on {} threads",
            self.level,
            pool.current_num_threads()
        );

        let tracker = Mutex::new(ProgressTracker::new(
            Arc::clone(&self.progress),
            OperationType::Compression,
            Some(count as u64),
        ));

        let mut outcomes: Vec<CompressionOutcome> = pool.install(|| {
            (1..=count)
                .into_par_iter()
                .map(|index| {
                    let outcome = self.compress_one(output_dir, index);
                    if let Ok(mut tracker) = tracker.lock() {
                        tracker.advance();
                    }
                    outcome
                })
                .collect()
        });
        outcomes.sort_by_key(CompressionOutcome::index);

        if let Ok(mut tracker) = tracker.lock() {
            tracker.finish();
        }

        Ok(CompressionReport {
            level: Some(self.level),
            outcomes,
        })
    }

    fn compress_one(&self, output_dir: &Path, index: usize) -> CompressionOutcome {
        let path = output_dir.join(screenshot_file_name(index));
        let failed = |path: PathBuf, reason: String| {
            log::debug!("Compressing {} failed: {reason}", path.display());
            CompressionOutcome::Failed {
                index,
                path,
                reason,
            }
        };

        if !path.is_file() {
            return failed(path, "screenshot was not extracted".to_string());
        }

        let output = match run_captured(
            Command::new(&self.program)
                .arg(format!("-o{}", self.level))
                .arg(&path),
        ) {
            Ok(output) => output,
            Err(error) => {
                let reason = format!("could not run {}: {error}", self.program.display());
                return failed(path, reason);
            }
        };

        if !output.status.success() {
            let reason = stderr_text(&output);
            return failed(path, reason);
        }

        let renamed = output_dir.join(compressed_file_name(index, self.level));
        if let Err(error) = fs::rename(&path, &renamed) {
            return failed(path, format!("rename failed: {error}"));
        }

        match file_size_kb(&renamed) {
            Ok(size_kb) => CompressionOutcome::Compressed {
                index,
                path: renamed,
                size_kb,
            },
            Err(error) => failed(renamed, error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(value: u8) -> CompressionLevel {
        CompressionLevel::new(value).unwrap()
    }

    #[test]
    fn compressed_name_embeds_level() {
        assert_eq!(compressed_file_name(3, level(4)), "screenshot_003_4.png");
    }

    #[test]
    fn worker_limit_selects_mode() {
        assert_eq!(CompressorPool::new("oxipng", level(2), Some(1)).mode(), CompressionMode::Serial);
        assert_eq!(
            CompressorPool::new("oxipng", level(2), None).mode(),
            CompressionMode::Parallel(None)
        );
        assert_eq!(
            CompressorPool::new("oxipng", level(2), Some(4)).mode(),
            CompressionMode::Parallel(Some(4))
        );
        assert_eq!(
            CompressorPool::new("oxipng", level(2), Some(0)).mode(),
            CompressionMode::Parallel(None)
        );
    }

    #[test]
    fn missing_input_is_a_per_item_failure() {
        let scratch = tempfile::tempdir().unwrap();
        let pool = CompressorPool::new("vidshot-no-such-compressor", level(2), Some(1));
        let report = pool.compress(scratch.path(), 2).unwrap();
        assert_eq!(report.failures(), 2);
        assert!(matches!(
            &report.outcomes[0],
            CompressionOutcome::Failed { reason, .. } if reason.contains("not extracted")
        ));
    }
}
