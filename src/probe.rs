//! Video duration probing.
//!
//! [`DurationProbe`] asks `ffprobe` for the container duration and parses
//! the bare number it prints. A probe failure ends the run: without a
//! duration there is nothing to sample from.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::VidshotError;
use crate::tools::{run_captured, stderr_text};

/// A probed video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    /// Path that was probed.
    pub path: PathBuf,
    /// Total playback length in seconds, always positive.
    pub duration: f64,
}

/// Duration prober backed by an `ffprobe` executable.
#[derive(Debug, Clone)]
pub struct DurationProbe {
    program: PathBuf,
}

impl Default for DurationProbe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl DurationProbe {
    /// Create a prober that runs `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Probe `video` and return its duration.
    ///
    /// # Errors
    ///
    /// Returns [`VidshotError::ProbeFailed`] if the prober cannot be
    /// spawned, exits unsuccessfully, or prints anything other than a
    /// positive number of seconds.
    pub fn probe<P: AsRef<Path>>(&self, video: P) -> Result<VideoInfo, VidshotError> {
        let video = video.as_ref();
        let failed = |reason: String| VidshotError::ProbeFailed {
            path: video.to_path_buf(),
            reason,
        };

        let output = run_captured(
            Command::new(&self.program)
                .args(["-v", "error"])
                .args(["-show_entries", "format=duration"])
                .args(["-of", "default=noprint_wrappers=1:nokey=1"])
                .arg(video),
        )
        .map_err(|error| failed(format!("could not run {}: {error}", self.program.display())))?;

        if !output.status.success() {
            return Err(failed(stderr_text(&output)));
        }

        let duration = parse_duration(&String::from_utf8_lossy(&output.stdout)).map_err(failed)?;
        log::debug!("{} lasts {duration:.3}s", video.display());

        Ok(VideoInfo {
            path: video.to_path_buf(),
            duration,
        })
    }
}

/// Parse prober output into a positive number of seconds.
pub(crate) fn parse_duration(stdout: &str) -> Result<f64, String> {
    let trimmed = stdout.trim();
    let duration: f64 = trimmed
        .parse()
        .map_err(|_| format!("unexpected prober output {trimmed:?}"))?;

    if !duration.is_finite() || duration <= 0.0 {
        return Err(format!("non-positive duration {trimmed}"));
    }
    Ok(duration)
}
