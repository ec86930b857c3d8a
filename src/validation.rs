//! Pre-flight checks for a run.
//!
//! [`validate_run`] looks at the requested screenshot count and at which
//! external programs are available, and returns a [`ValidationReport`]
//! before anything touches the disk.
//!
//! # Example
//!
//! ```no_run
//! use vidshot::{ToolPaths, validate_run};
//!
//! let report = validate_run(10, &ToolPaths::default());
//! for error in &report.errors {
//!     eprintln!("{error}");
//! }
//! ```

use crate::configuration::CONFIRMATION_THRESHOLD;
use crate::tools::ToolPaths;

/// Outcome of the pre-flight checks.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Non-fatal issues, such as a missing compressor.
    pub warnings: Vec<String>,
    /// Fatal issues that prevent the run.
    pub errors: Vec<String>,
    /// Whether the compressor was found.
    pub compressor_available: bool,
    /// More than [`CONFIRMATION_THRESHOLD`] screenshots were requested.
    pub needs_confirmation: bool,
}

impl ValidationReport {
    /// Returns `true` if no errors were found.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check a run of `count` screenshots against the available tools.
pub fn validate_run(count: usize, tools: &ToolPaths) -> ValidationReport {
    let mut report = ValidationReport {
        compressor_available: ToolPaths::is_available(&tools.oxipng),
        needs_confirmation: count > CONFIRMATION_THRESHOLD,
        ..ValidationReport::default()
    };

    if count == 0 {
        report
            .errors
            .push("Screenshot count must be at least 1".to_string());
    }

    for program in [&tools.ffmpeg, &tools.ffprobe] {
        if !ToolPaths::is_available(program) {
            report.errors.push(format!(
                "{} is not installed; install FFmpeg before running",
                program.display()
            ));
        }
    }

    if !report.compressor_available {
        report.warnings.push(format!(
            "{} is not installed, compression is unavailable (run `vidshot oxipng` to install it)",
            tools.oxipng.display()
        ));
    }

    report
}
