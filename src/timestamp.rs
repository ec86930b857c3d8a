//! Random screenshot timestamps.
//!
//! Screenshots are taken at uniformly random points of the video, skipping
//! the first five minutes (intros, logos) and the last fifteen (credits).
//! Short videos collapse the window to its start, so every draw lands on
//! the 5 minute mark.
//!
//! # Example
//!
//! ```
//! use vidshot::timestamp::{Timestamp, sample_timestamps};
//!
//! let timestamps = sample_timestamps(3600.0, 3)?;
//! assert_eq!(timestamps.len(), 3);
//! for timestamp in &timestamps {
//!     assert!(timestamp.as_seconds() >= 300.0);
//!     assert!(timestamp.as_seconds() <= 2700.0);
//! }
//!
//! assert_eq!(Timestamp::from_seconds(3725.5).to_string(), "01:02:05.500");
//! # Ok::<(), vidshot::VidshotError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use rand::Rng;

use crate::error::VidshotError;

/// Seconds skipped at the start of the video.
pub const SKIP_HEAD_SECONDS: f64 = 300.0;

/// Seconds skipped at the end of the video.
pub const SKIP_TAIL_SECONDS: f64 = 900.0;

/// A point in the video with millisecond precision.
///
/// Displays as `HH:MM:SS.mmm`, the form handed to the frame extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    milliseconds: u64,
}

impl Timestamp {
    /// Build a timestamp from seconds, truncating below one millisecond.
    ///
    /// Negative and NaN inputs saturate to zero.
    pub fn from_seconds(seconds: f64) -> Self {
        let milliseconds = (seconds * 1000.0).floor();
        Self {
            milliseconds: if milliseconds.is_finite() && milliseconds > 0.0 {
                milliseconds as u64
            } else {
                0
            },
        }
    }

    /// The timestamp in seconds.
    pub fn as_seconds(&self) -> f64 {
        self.milliseconds as f64 / 1000.0
    }

    /// The timestamp in whole milliseconds.
    pub fn as_milliseconds(&self) -> u64 {
        self.milliseconds
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let total_seconds = self.milliseconds / 1000;
        write!(
            f,
            "{:02}:{:02}:{:02}.{:03}",
            total_seconds / 3600,
            (total_seconds % 3600) / 60,
            total_seconds % 60,
            self.milliseconds % 1000,
        )
    }
}

impl FromStr for Timestamp {
    type Err = VidshotError;

    /// Accepts `SS[.fff]`, `MM:SS[.fff]`, and `HH:MM:SS[.fff]`. Minutes and
    /// seconds must stay below 60 once a colon is present.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let invalid = || VidshotError::InvalidTimestamp(value.to_string());
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        let (hours, minutes, seconds_str) = match parts.as_slice() {
            [seconds] => (0_u64, 0_u64, *seconds),
            [minutes, seconds] => (0, minutes.parse().map_err(|_| invalid())?, *seconds),
            [hours, minutes, seconds] => (
                hours.parse().map_err(|_| invalid())?,
                minutes.parse().map_err(|_| invalid())?,
                *seconds,
            ),
            _ => return Err(invalid()),
        };

        let seconds: f64 = seconds_str.parse().map_err(|_| invalid())?;
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(invalid());
        }
        // Only a bare seconds value may exceed a minute.
        if parts.len() > 1 && (minutes >= 60 || seconds >= 60.0) {
            return Err(invalid());
        }

        // Round the fractional part: the text already has millisecond precision.
        Ok(Self {
            milliseconds: hours
                .saturating_mul(3_600_000)
                .saturating_add(minutes.saturating_mul(60_000))
                .saturating_add((seconds * 1000.0).round() as u64),
        })
    }
}

/// The `[start, end]` window random timestamps are drawn from.
///
/// `end` never drops below `start`.
pub fn sampling_window(duration: f64) -> (f64, f64) {
    let start = SKIP_HEAD_SECONDS;
    let end = (duration - SKIP_TAIL_SECONDS).max(start);
    (start, end)
}

/// Draw `count` random timestamps for a video of `duration` seconds.
///
/// Draws are independent; duplicates are possible.
///
/// # Errors
///
/// Returns [`VidshotError::InvalidDuration`] if `duration` is not a
/// positive finite number.
pub fn sample_timestamps(duration: f64, count: usize) -> Result<Vec<Timestamp>, VidshotError> {
    sample_timestamps_with(&mut rand::rng(), duration, count)
}

/// Like [`sample_timestamps`], drawing from the supplied generator.
pub fn sample_timestamps_with<R: Rng + ?Sized>(
    rng: &mut R,
    duration: f64,
    count: usize,
) -> Result<Vec<Timestamp>, VidshotError> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(VidshotError::InvalidDuration(duration));
    }

    let (start, end) = sampling_window(duration);
    log::debug!("Sampling {count} timestamps in [{start:.3}, {end:.3}]");

    Ok((0..count)
        .map(|_| {
            let seconds = rng.random_range(start..=end).clamp(start, end);
            Timestamp::from_seconds(seconds)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn formats_hours_minutes_seconds_millis() {
        assert_eq!(Timestamp::from_seconds(0.0).to_string(), "00:00:00.000");
        assert_eq!(Timestamp::from_seconds(300.0).to_string(), "00:05:00.000");
        assert_eq!(Timestamp::from_seconds(3725.5).to_string(), "01:02:05.500");
        assert_eq!(Timestamp::from_seconds(59.0429).to_string(), "00:00:59.042");
    }

    #[test]
    fn negative_and_nan_saturate_to_zero() {
        assert_eq!(Timestamp::from_seconds(-4.0).as_milliseconds(), 0);
        assert_eq!(Timestamp::from_seconds(f64::NAN).as_milliseconds(), 0);
    }

    #[test]
    fn parses_all_forms() {
        assert_eq!("75".parse::<Timestamp>().unwrap().as_seconds(), 75.0);
        assert_eq!("01:15".parse::<Timestamp>().unwrap().as_seconds(), 75.0);
        assert_eq!(
            "00:01:15.250".parse::<Timestamp>().unwrap().as_milliseconds(),
            75_250
        );
        assert!("".parse::<Timestamp>().is_err());
        assert!("1:2:3:4".parse::<Timestamp>().is_err());
        assert!("aa:10".parse::<Timestamp>().is_err());
        assert!("-3".parse::<Timestamp>().is_err());
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert!("00:61:15".parse::<Timestamp>().is_err());
        assert!("00:01:75".parse::<Timestamp>().is_err());
        assert!("00:61:75".parse::<Timestamp>().is_err());
        assert!("01:60".parse::<Timestamp>().is_err());
        assert!("00:00:59.999".parse::<Timestamp>().is_ok());
        assert_eq!("100:00:00".parse::<Timestamp>().unwrap().as_seconds(), 360_000.0);
        assert_eq!("3600".parse::<Timestamp>().unwrap().as_seconds(), 3600.0);
    }

    #[test]
    fn display_and_parse_agree() {
        let timestamp = Timestamp::from_seconds(4321.987);
        let parsed: Timestamp = timestamp.to_string().parse().unwrap();
        assert_eq!(parsed, timestamp);
    }

    #[test]
    fn window_clamps_for_short_videos() {
        assert_eq!(sampling_window(3600.0), (300.0, 2700.0));
        assert_eq!(sampling_window(1000.0), (300.0, 300.0));
        assert_eq!(sampling_window(10.0), (300.0, 300.0));
    }

    #[test]
    fn rejects_non_positive_duration() {
        assert!(matches!(
            sample_timestamps(0.0, 3),
            Err(VidshotError::InvalidDuration(_))
        ));
        assert!(sample_timestamps(-1.0, 3).is_err());
        assert!(sample_timestamps(f64::NAN, 3).is_err());
    }

    #[test]
    fn seeded_draws_are_reproducible() {
        let first = sample_timestamps_with(&mut StdRng::seed_from_u64(7), 7200.0, 5).unwrap();
        let second = sample_timestamps_with(&mut StdRng::seed_from_u64(7), 7200.0, 5).unwrap();
        assert_eq!(first, second);
    }
}
