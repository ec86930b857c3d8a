//! Error types for the `vidshot` crate.
//!
//! This module defines [`VidshotError`], the unified error type returned by
//! every fatal operation in the crate. Per-item failures (one frame that
//! could not be extracted, one file that failed to upload) are not errors
//! in this sense: they are recorded in the stage reports and the run goes
//! on.

use std::{io::Error as IoError, path::PathBuf};

use thiserror::Error;

/// The unified error type for all `vidshot` operations.
///
/// Every public method that can abort a run returns
/// `Result<T, VidshotError>`. The binary prints the message and exits with
/// status 1; library code never terminates the process.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VidshotError {
    /// A required external program could not be found on the search path.
    #[error("{program} is not installed or not on PATH")]
    ToolNotFound {
        /// Program name that was looked up.
        program: String,
    },

    /// The video file does not exist or is not a regular file.
    #[error("Video file not found: {0}")]
    VideoNotFound(PathBuf),

    /// The duration prober failed or printed something that is not a
    /// positive number of seconds.
    #[error("Failed to read video duration of {path}: {reason}")]
    ProbeFailed {
        /// Video that was probed.
        path: PathBuf,
        /// Why the probe failed.
        reason: String,
    },

    /// A duration that cannot be sampled from (zero, negative, NaN).
    #[error("Invalid video duration: {0}")]
    InvalidDuration(f64),

    /// A timestamp string that could not be parsed.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The screenshot count is not a positive integer.
    #[error("Screenshot count must be an integer >= 1, got {0:?}")]
    InvalidScreenshotCount(String),

    /// The compression level is outside 1-6.
    #[error("Compression level must be between 1 and 6, got {0}")]
    InvalidCompressionLevel(String),

    /// The user declined an interactive confirmation.
    #[error("Operation cancelled")]
    Aborted,

    /// The installer does not support this operating system or CPU.
    #[error("{0}")]
    UnsupportedPlatform(String),

    /// Downloading the compressor release archive failed.
    #[error("Download of {url} failed: {reason}")]
    DownloadFailed {
        /// Archive URL.
        url: String,
        /// Underlying reason.
        reason: String,
    },

    /// The release archive could not be unpacked or did not contain the
    /// expected binary.
    #[error("Archive error: {0}")]
    ArchiveError(String),

    /// Moving the binary into place or verifying it failed.
    #[error("Install failed: {0}")]
    InstallFailed(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),
}
