//! The screenshot pipeline.
//!
//! [`Pipeline`] strings the stages together: probe the duration, sample
//! timestamps, reset the output directory, extract frames, optionally
//! compress, and upload. [`Pipeline::run`] does all of it; the stage
//! methods are public so a caller can report or ask questions in between.
//!
//! # Example
//!
//! ```no_run
//! use vidshot::{Pipeline, RunOptions};
//!
//! let report = Pipeline::new(RunOptions::new(4)).run("movie.mkv")?;
//! if let Some(upload) = &report.upload {
//!     for link in upload.direct_links() {
//!         println!("{link}");
//!     }
//! }
//! # Ok::<(), vidshot::VidshotError>(())
//! ```

use std::path::Path;
use std::sync::Arc;

use crate::capture::{CaptureReport, FrameExtractor};
use crate::compress::{CompressionReport, CompressorPool};
use crate::configuration::{CompressionLevel, RunOptions};
use crate::error::VidshotError;
use crate::probe::{DurationProbe, VideoInfo};
use crate::timestamp::{Timestamp, sample_timestamps};
use crate::upload::{UploadSummary, Uploader};
use crate::workspace::reset_directory;

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunReport {
    /// The probed video.
    pub video: VideoInfo,
    /// Sampled timestamps, in screenshot order.
    pub timestamps: Vec<Timestamp>,
    /// Extraction outcomes.
    pub capture: CaptureReport,
    /// Compression outcomes, when compression ran.
    pub compression: Option<CompressionReport>,
    /// Upload results, when uploading is enabled.
    pub upload: Option<UploadSummary>,
}

/// Runs the stages with one [`RunOptions`].
#[derive(Debug, Clone)]
pub struct Pipeline {
    options: RunOptions,
}

impl Pipeline {
    /// Create a pipeline.
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    /// The options this pipeline runs with.
    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Run every stage.
    ///
    /// Compression runs when the options carry a level; it is skipped with
    /// a warning when the compressor is not installed.
    pub fn run<P: AsRef<Path>>(&self, video: P) -> Result<RunReport, VidshotError> {
        let video = self.probe(video.as_ref())?;
        let timestamps = self.sample(&video)?;
        self.prepare_output()?;
        let capture = self.capture(&video, &timestamps);

        let compression = match self.options.compression {
            Some(level) if self.compressor_available() => Some(self.compress(level)?),
            Some(_) => {
                log::warn!(
                    "{} not found, skipping compression",
                    self.options.tools.oxipng.display()
                );
                None
            }
            None => None,
        };

        let upload = self.upload()?;

        Ok(RunReport {
            video,
            timestamps,
            capture,
            compression,
            upload,
        })
    }

    /// Check the video and the mandatory tools, then read the duration.
    pub fn probe(&self, video: &Path) -> Result<VideoInfo, VidshotError> {
        if !video.is_file() {
            return Err(VidshotError::VideoNotFound(video.to_path_buf()));
        }
        self.options.tools.require_mandatory()?;
        DurationProbe::new(&self.options.tools.ffprobe).probe(video)
    }

    /// Draw the screenshot timestamps.
    pub fn sample(&self, video: &VideoInfo) -> Result<Vec<Timestamp>, VidshotError> {
        if self.options.count == 0 {
            return Err(VidshotError::InvalidScreenshotCount("0".to_string()));
        }
        sample_timestamps(video.duration, self.options.count)
    }

    /// Empty (or create) the output directory.
    pub fn prepare_output(&self) -> Result<(), VidshotError> {
        reset_directory(&self.options.output_dir)
    }

    /// Extract one screenshot per timestamp.
    pub fn capture(&self, video: &VideoInfo, timestamps: &[Timestamp]) -> CaptureReport {
        FrameExtractor::new(&self.options.tools.ffmpeg)
            .with_progress(Arc::clone(&self.options.progress))
            .capture(&video.path, timestamps, &self.options.output_dir)
    }

    /// Compress the extracted screenshots at `level`.
    pub fn compress(&self, level: CompressionLevel) -> Result<CompressionReport, VidshotError> {
        self.compressor(level)
            .compress(&self.options.output_dir, self.options.count)
    }

    /// The compression pool this pipeline would use at `level`.
    pub fn compressor(&self, level: CompressionLevel) -> CompressorPool {
        CompressorPool::new(&self.options.tools.oxipng, level, self.options.workers)
            .with_progress(Arc::clone(&self.options.progress))
    }

    /// Upload the output directory, or `None` when uploading is disabled.
    pub fn upload(&self) -> Result<Option<UploadSummary>, VidshotError> {
        let Some(upload) = &self.options.upload else {
            return Ok(None);
        };
        let uploader =
            Uploader::new(upload.clone())?.with_progress(Arc::clone(&self.options.progress));
        uploader.upload_directory(&self.options.output_dir).map(Some)
    }

    /// Whether the configured compressor is installed.
    pub fn compressor_available(&self) -> bool {
        self.options.tools.compressor_available()
    }
}
