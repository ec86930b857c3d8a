//! External program discovery and invocation.
//!
//! `vidshot` drives three command-line programs: `ffprobe` for the
//! duration, `ffmpeg` for the frames, and the optional `oxipng` for PNG
//! compression. [`ToolPaths`] names them (plain program names by default,
//! resolved on `PATH`), so tests and unusual installs can point at
//! something else.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use crate::error::VidshotError;

/// Program names or paths of the external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    /// Frame extractor.
    pub ffmpeg: PathBuf,
    /// Duration prober.
    pub ffprobe: PathBuf,
    /// PNG compressor.
    pub oxipng: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            oxipng: PathBuf::from("oxipng"),
        }
    }
}

impl ToolPaths {
    /// Returns `true` if `program` resolves to an executable.
    pub fn is_available(program: &Path) -> bool {
        which::which(program).is_ok()
    }

    /// Resolve `program` on `PATH`, failing with
    /// [`VidshotError::ToolNotFound`].
    pub fn require(program: &Path) -> Result<PathBuf, VidshotError> {
        which::which(program).map_err(|_| VidshotError::ToolNotFound {
            program: program.display().to_string(),
        })
    }

    /// Check that the mandatory tools (extractor and prober) are present.
    pub fn require_mandatory(&self) -> Result<(), VidshotError> {
        Self::require(&self.ffmpeg)?;
        Self::require(&self.ffprobe)?;
        Ok(())
    }

    /// Returns `true` if the optional compressor is installed.
    pub fn compressor_available(&self) -> bool {
        Self::is_available(&self.oxipng)
    }
}

/// Run a command to completion, capturing stdout and stderr.
pub(crate) fn run_captured(command: &mut Command) -> std::io::Result<Output> {
    log::debug!("Running {}", describe(command));
    command.output()
}

/// Trimmed, lossily decoded stderr of a finished process.
pub(crate) fn stderr_text(output: &Output) -> String {
    let text = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if text.is_empty() {
        format!("exited with {}", output.status)
    } else {
        text
    }
}

fn describe(command: &Command) -> String {
    let mut line = command.get_program().to_string_lossy().into_owned();
    for argument in command.get_args() {
        line.push(' ');
        line.push_str(&OsStr::to_string_lossy(argument));
    }
    line
}
