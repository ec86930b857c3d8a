//! Run configuration.
//!
//! [`RunOptions`] is a builder that carries everything a run needs (output
//! directory, screenshot count, compression settings, tool locations,
//! upload settings, progress callback) into the [`Pipeline`](crate::Pipeline)
//! without any process-wide state.
//!
//! # Example
//!
//! ```
//! use vidshot::{CompressionLevel, RunOptions};
//!
//! let options = RunOptions::new(8)
//!     .with_output_dir("shots")
//!     .with_compression(CompressionLevel::new(4)?)
//!     .with_workers(Some(2));
//! assert_eq!(options.count(), 8);
//! # Ok::<(), vidshot::VidshotError>(())
//! ```

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::VidshotError;
use crate::progress::{NoOpProgress, ProgressCallback};
use crate::tools::ToolPaths;
use crate::workspace::DEFAULT_OUTPUT_DIR;

/// Screenshot counts above this ask for confirmation first.
pub const CONFIRMATION_THRESHOLD: usize = 50;

/// A PNG compressor optimisation level, 1 (fast) to 6 (thorough).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// Lowest accepted level.
    pub const MIN: u8 = 1;
    /// Highest accepted level.
    pub const MAX: u8 = 6;

    /// Validate a level.
    ///
    /// # Errors
    ///
    /// Returns [`VidshotError::InvalidCompressionLevel`] outside 1-6.
    pub fn new(level: u8) -> Result<Self, VidshotError> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(VidshotError::InvalidCompressionLevel(level.to_string()))
        }
    }

    /// The numeric level.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Display for CompressionLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CompressionLevel {
    type Err = VidshotError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let level: u8 = trimmed
            .parse()
            .map_err(|_| VidshotError::InvalidCompressionLevel(trimmed.to_string()))?;
        Self::new(level)
    }
}

/// A validated, positive number of screenshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScreenshotCount(usize);

impl ScreenshotCount {
    /// Parse a count argument. Zero, negative, and non-numeric values are
    /// rejected.
    pub fn parse(value: &str) -> Result<Self, VidshotError> {
        let trimmed = value.trim();
        match trimmed.parse::<usize>() {
            Ok(count) if count >= 1 => Ok(Self(count)),
            _ => Err(VidshotError::InvalidScreenshotCount(trimmed.to_string())),
        }
    }

    /// The count.
    pub fn get(self) -> usize {
        self.0
    }

    /// Returns `true` if the count is large enough to warrant a prompt.
    pub fn needs_confirmation(self) -> bool {
        self.0 > CONFIRMATION_THRESHOLD
    }
}

/// Image host settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Upload endpoint.
    pub endpoint: String,
    /// Value of the `content_type` form field (`0` = family safe).
    pub content_type: String,
    /// Value of the `max_th_size` form field (thumbnail size in pixels).
    pub thumbnail_size: u32,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            endpoint: "https://api.pixhost.to/images".to_string(),
            content_type: "0".to_string(),
            thumbnail_size: 420,
        }
    }
}

impl UploadOptions {
    /// Point the uploader at a different endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Configuration for one screenshot run.
#[derive(Clone)]
pub struct RunOptions {
    pub(crate) output_dir: PathBuf,
    pub(crate) count: usize,
    pub(crate) compression: Option<CompressionLevel>,
    /// `None` = rayon's default parallelism, `Some(1)` = serial.
    pub(crate) workers: Option<usize>,
    pub(crate) tools: ToolPaths,
    pub(crate) upload: Option<UploadOptions>,
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl Debug for RunOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RunOptions")
            .field("output_dir", &self.output_dir)
            .field("count", &self.count)
            .field("compression", &self.compression)
            .field("workers", &self.workers)
            .field("tools", &self.tools)
            .field("upload", &self.upload)
            .finish()
    }
}

impl RunOptions {
    /// Options for `count` screenshots with default settings.
    ///
    /// Defaults: output to `screenshots/`, no compression, default
    /// parallelism, tools from `PATH`, upload to Pixhost, no progress
    /// callback.
    pub fn new(count: usize) -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            count,
            compression: None,
            workers: None,
            tools: ToolPaths::default(),
            upload: Some(UploadOptions::default()),
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Set the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, directory: impl Into<PathBuf>) -> Self {
        self.output_dir = directory.into();
        self
    }

    /// Compress screenshots at `level` after extraction.
    #[must_use]
    pub fn with_compression(mut self, level: CompressionLevel) -> Self {
        self.compression = Some(level);
        self
    }

    /// Bound the compression pool. `Some(0)` is treated as `None`.
    #[must_use]
    pub fn with_workers(mut self, workers: Option<usize>) -> Self {
        self.workers = workers.filter(|&count| count > 0);
        self
    }

    /// Use different external programs.
    #[must_use]
    pub fn with_tools(mut self, tools: ToolPaths) -> Self {
        self.tools = tools;
        self
    }

    /// Upload settings, or `None` to keep the screenshots local.
    #[must_use]
    pub fn with_upload(mut self, upload: Option<UploadOptions>) -> Self {
        self.upload = upload;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// The output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Number of screenshots to take.
    pub fn count(&self) -> usize {
        self.count
    }

    /// The compression level, if compression is enabled.
    pub fn compression(&self) -> Option<CompressionLevel> {
        self.compression
    }

    /// The compression worker limit.
    pub fn workers(&self) -> Option<usize> {
        self.workers
    }

    /// The external programs.
    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    /// Upload settings, `None` when uploading is disabled.
    pub fn upload(&self) -> Option<&UploadOptions> {
        self.upload.as_ref()
    }
}
