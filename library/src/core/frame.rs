//! Conversions between elapsed milliseconds, frame counts and the
//! `mm:ss:zzz` display format.
//!
//! Everything here is pure. Frame counts truncate toward zero, times round
//! up, so converting a frame to a time and back never reports an earlier
//! frame.

use crate::error::TimingError;

/// Largest elapsed time the `mm:ss:zzz` format can show (59:59:999).
pub const MAX_ELAPSED_MS: u64 = 59 * 60_000 + 59 * 1_000 + 999;

pub const FPS_PRESETS: [u32; 9] = [6, 12, 15, 24, 25, 30, 48, 50, 60];
pub const MIN_FPS: u32 = 6;
pub const MAX_FPS: u32 = 120;
pub const DEFAULT_FPS: u32 = 24;

fn check_fps(fps: u32) -> Result<u64, TimingError> {
    if fps == 0 {
        return Err(TimingError::InvalidFps(fps));
    }
    Ok(fps as u64)
}

fn check_non_negative(value: i64, what: &str) -> Result<u64, TimingError> {
    u64::try_from(value)
        .map_err(|_| TimingError::InvalidArgument(format!("{} cannot be negative ({})", what, value)))
}

fn out_of_range(what: &str, value: u64) -> TimingError {
    TimingError::InvalidArgument(format!("{} {} is out of range", what, value))
}

/// Frame reached after `elapsed_ms` at `fps`, truncated toward zero.
pub fn frames_for(elapsed_ms: i64, fps: u32) -> Result<u64, TimingError> {
    let fps = check_fps(fps)?;
    let elapsed_ms = check_non_negative(elapsed_ms, "elapsed time")?;
    fps.checked_mul(elapsed_ms)
        .map(|scaled| scaled / 1000)
        .ok_or_else(|| out_of_range("elapsed time", elapsed_ms))
}

/// Time in milliseconds at which `frame` starts, rounded up.
pub fn time_ms_for(frame: i64, fps: u32) -> Result<u64, TimingError> {
    let fps = check_fps(fps)?;
    let frame = check_non_negative(frame, "frame")?;
    frame
        .checked_mul(1000)
        .map(|scaled| scaled.div_ceil(fps))
        .ok_or_else(|| out_of_range("frame", frame))
}

/// Shortest refresh period that still shows every frame boundary at `fps`.
pub fn tick_interval_ms(fps: u32) -> Result<u64, TimingError> {
    let fps = check_fps(fps)?;
    Ok(1000u64.div_ceil(fps))
}

/// Formats milliseconds as `mm:ss:zzz`.
///
/// Fails for values past [`MAX_ELAPSED_MS`]; the display has no hour field.
pub fn format_time(ms: i64) -> Result<String, TimingError> {
    let ms = check_non_negative(ms, "time")?;
    if ms > MAX_ELAPSED_MS {
        return Err(TimingError::InvalidArgument(format!(
            "{} ms does not fit in mm:ss:zzz",
            ms
        )));
    }
    let minutes = ms / 60_000;
    let seconds = (ms / 1_000) % 60;
    let millis = ms % 1_000;
    Ok(format!("{:02}:{:02}:{:03}", minutes, seconds, millis))
}

/// Parses `mm:ss:zzz` back into milliseconds.
pub fn parse_time(text: &str) -> Result<u64, TimingError> {
    let invalid = || TimingError::InvalidArgument(format!("'{}' is not a mm:ss:zzz time", text));

    let mut parts = text.trim().split(':');
    let (Some(m), Some(s), Some(z), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let minutes: u64 = m.parse().map_err(|_| invalid())?;
    let seconds: u64 = s.parse().map_err(|_| invalid())?;
    let millis: u64 = z.parse().map_err(|_| invalid())?;
    if minutes > 59 || seconds > 59 || millis > 999 {
        return Err(invalid());
    }

    Ok(minutes * 60_000 + seconds * 1_000 + millis)
}

pub fn is_preset(fps: u32) -> bool {
    FPS_PRESETS.contains(&fps)
}

/// Range check applied to user-chosen and loaded frame rates.
pub fn validate_fps(fps: u32) -> Result<u32, TimingError> {
    if (MIN_FPS..=MAX_FPS).contains(&fps) {
        Ok(fps)
    } else {
        Err(TimingError::InvalidFps(fps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_truncate() {
        assert_eq!(frames_for(0, 24).unwrap(), 0);
        assert_eq!(frames_for(41, 24).unwrap(), 0);
        assert_eq!(frames_for(42, 24).unwrap(), 1);
        assert_eq!(frames_for(1_000, 24).unwrap(), 24);
        assert_eq!(frames_for(1_500, 30).unwrap(), 45);
    }

    #[test]
    fn time_rounds_up() {
        assert_eq!(time_ms_for(0, 24).unwrap(), 0);
        assert_eq!(time_ms_for(1, 24).unwrap(), 42);
        assert_eq!(time_ms_for(12, 24).unwrap(), 500);
        assert_eq!(time_ms_for(1, 30).unwrap(), 34);
    }

    #[test]
    fn tick_interval_matches_ceiling() {
        assert_eq!(tick_interval_ms(24).unwrap(), 42);
        assert_eq!(tick_interval_ms(30).unwrap(), 34);
        assert_eq!(tick_interval_ms(60).unwrap(), 17);
        assert_eq!(tick_interval_ms(25).unwrap(), 40);
    }

    #[test]
    fn zero_fps_is_rejected() {
        assert!(matches!(frames_for(10, 0), Err(TimingError::InvalidFps(0))));
        assert!(matches!(time_ms_for(10, 0), Err(TimingError::InvalidFps(0))));
        assert!(matches!(tick_interval_ms(0), Err(TimingError::InvalidFps(0))));
    }

    #[test]
    fn negative_input_is_rejected() {
        assert!(matches!(frames_for(-1, 24), Err(TimingError::InvalidArgument(_))));
        assert!(matches!(time_ms_for(-5, 24), Err(TimingError::InvalidArgument(_))));
        assert!(matches!(format_time(-1), Err(TimingError::InvalidArgument(_))));
    }

    #[test]
    fn overflowing_input_is_rejected() {
        assert!(matches!(frames_for(i64::MAX, 24), Err(TimingError::InvalidArgument(_))));
        assert!(matches!(
            time_ms_for(9_000_000_000_000_000_000, 24),
            Err(TimingError::InvalidArgument(_))
        ));
        assert!(time_ms_for(i64::MAX / 1000, 24).is_ok());
    }

    #[test]
    fn format_and_parse() {
        assert_eq!(format_time(0).unwrap(), "00:00:000");
        assert_eq!(format_time(61_042).unwrap(), "01:01:042");
        assert_eq!(format_time(MAX_ELAPSED_MS as i64).unwrap(), "59:59:999");
        assert!(format_time(MAX_ELAPSED_MS as i64 + 1).is_err());

        assert_eq!(parse_time("01:01:042").unwrap(), 61_042);
        assert_eq!(parse_time(" 00:00:500 ").unwrap(), 500);
        assert!(parse_time("01:61:000").is_err());
        assert!(parse_time("1:2").is_err());
        assert!(parse_time("aa:bb:ccc").is_err());
    }

    #[test]
    fn fps_range() {
        assert!(is_preset(24));
        assert!(!is_preset(23));
        assert_eq!(validate_fps(120).unwrap(), 120);
        assert!(validate_fps(5).is_err());
        assert!(validate_fps(121).is_err());
    }
}
