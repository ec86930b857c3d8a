//! # vidshot
//!
//! Grab random screenshots from a video, optionally compress them, and
//! upload them to an image host.
//!
//! `vidshot` drives `ffprobe` and `ffmpeg` to take lossless PNG frames at
//! random points of a video (skipping the first 5 and the last 15
//! minutes), `oxipng` to shrink them on a bounded thread pool, and the
//! Pixhost API to publish them as direct links and BBCode.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vidshot::{CompressionLevel, Pipeline, RunOptions};
//!
//! let options = RunOptions::new(6).with_compression(CompressionLevel::new(2)?);
//! let report = Pipeline::new(options).run("movie.mkv")?;
//!
//! println!("{} screenshots taken", report.capture.succeeded());
//! if let Some(upload) = &report.upload {
//!     for bbcode in upload.bbcodes() {
//!         println!("{bbcode}");
//!     }
//! }
//! # Ok::<(), vidshot::VidshotError>(())
//! ```
//!
//! ## Stages
//!
//! - **Probe**: [`DurationProbe`] reads the container duration.
//! - **Sample**: [`sample_timestamps`] draws uniform random timestamps.
//! - **Capture**: [`FrameExtractor`] writes `screenshot_NNN.png` files.
//! - **Compress**: [`CompressorPool`] runs the compressor over them,
//!   renaming each file to `screenshot_NNN_<level>.png` on success.
//! - **Upload**: [`Uploader`] posts each file and collects the links.
//!
//! Per-file failures in the last three stages are recorded in their
//! reports and never abort the run.
//!
//! ## Requirements
//!
//! `ffmpeg` and `ffprobe` must be on `PATH`. `oxipng` is optional; on
//! Linux x86_64 it can be installed with [`Installer`].

pub mod capture;
pub mod compress;
pub mod configuration;
pub mod error;
pub mod install;
pub mod pipeline;
pub mod probe;
pub mod progress;
pub mod prompt;
pub mod timestamp;
pub mod tools;
pub mod upload;
pub mod validation;
pub mod workspace;

pub use capture::{CaptureOutcome, CaptureReport, FrameExtractor, Screenshot, screenshot_file_name};
pub use compress::{
    CompressionMode, CompressionOutcome, CompressionReport, CompressorPool, compressed_file_name,
};
pub use configuration::{
    CONFIRMATION_THRESHOLD, CompressionLevel, RunOptions, ScreenshotCount, UploadOptions,
};
pub use error::VidshotError;
pub use install::{InstallStep, Installer, UninstallOutcome};
pub use pipeline::{Pipeline, RunReport};
pub use probe::{DurationProbe, VideoInfo};
pub use progress::{OperationType, ProgressCallback, ProgressInfo};
pub use timestamp::{Timestamp, sample_timestamps};
pub use tools::ToolPaths;
pub use upload::{UploadError, UploadFailure, UploadSummary, UploadedImage, Uploader};
pub use validation::{ValidationReport, validate_run};
