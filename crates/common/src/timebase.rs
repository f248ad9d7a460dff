//! Frame timebase utilities.
//!
//! Pose tracks and their source videos share a constant frame rate. All
//! time values in Zoomies are derived from frame indices through a
//! [`FrameClock`] rather than from per-frame timestamps.

/// Converts between frame indices and seconds at a constant frame rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    fps: f64,
}

impl FrameClock {
    /// Create a clock for the given frame rate.
    ///
    /// Returns `None` when `fps` is not a positive, finite number.
    pub fn new(fps: f64) -> Option<Self> {
        if fps.is_finite() && fps > 0.0 {
            Some(Self { fps })
        } else {
            None
        }
    }

    /// Frames per second.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Time in seconds at which `frame` is presented.
    pub fn secs_at(&self, frame: u64) -> f64 {
        frame as f64 / self.fps
    }

    /// Duration in seconds of `frames` frames.
    pub fn duration_of(&self, frames: u64) -> f64 {
        frames as f64 / self.fps
    }
}

/// Format seconds as `HH:MM:SS.mmm` for ffmpeg seek arguments.
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
}

/// Parse an ffprobe frame rate such as `"30000/1001"` or `"25"`.
///
/// Returns `None` for zero, negative, or malformed rates.
pub fn parse_frame_rate(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let fps = match raw.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => raw.parse().ok()?,
    };
    FrameClock::new(fps).map(|clock| clock.fps())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_rejects_invalid_rates() {
        assert!(FrameClock::new(0.0).is_none());
        assert!(FrameClock::new(-25.0).is_none());
        assert!(FrameClock::new(f64::NAN).is_none());
        assert!(FrameClock::new(f64::INFINITY).is_none());
        assert!(FrameClock::new(25.0).is_some());
    }

    #[test]
    fn test_frame_seconds_conversion() {
        let clock = FrameClock::new(25.0).unwrap();
        assert!((clock.secs_at(50) - 2.0).abs() < 1e-12);
        assert!((clock.duration_of(250) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00:00.000");
        assert_eq!(format_timestamp(1.84), "00:00:01.840");
        assert_eq!(format_timestamp(3725.5), "01:02:05.500");
        assert_eq!(format_timestamp(-3.0), "00:00:00.000");
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        assert_eq!(parse_frame_rate("25/1"), Some(25.0));
        let ntsc = parse_frame_rate("30000/1001").unwrap();
        assert!((ntsc - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("0"), None);
        assert_eq!(parse_frame_rate("abc"), None);
    }
}
