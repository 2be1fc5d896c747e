//! Conversion helpers shared by dialect codecs.

use crate::error::{Result, SubtrackError};
use crate::timecode::{TimeCode, BASE_UNIT};

/// Snap the well-known NTSC-drift rates to their exact rational form so
/// frame-rate conversions do not compound rounding error.
pub fn frame_rate_for_calculation(frame_rate: f64) -> f64 {
    if (frame_rate - 23.976).abs() < 0.01 {
        return 24000.0 / 1001.0;
    }
    if (frame_rate - 29.97).abs() < 0.01 {
        return 30000.0 / 1001.0;
    }
    if (frame_rate - 59.94).abs() < 0.01 {
        return 60000.0 / 1001.0;
    }
    frame_rate
}

pub fn milliseconds_to_frames(milliseconds: f64, frame_rate: f64) -> i32 {
    (milliseconds / (BASE_UNIT / frame_rate)).round() as i32
}

/// Frame count within one second; clamped below the rate itself.
pub fn milliseconds_to_frames_max_frame_rate(milliseconds: f64, frame_rate: f64) -> i32 {
    let frames = (milliseconds / (BASE_UNIT / frame_rate)).round() as i32;
    if frames as f64 >= frame_rate {
        (frame_rate - 0.01) as i32
    } else {
        frames
    }
}

pub fn frames_to_milliseconds(frames: f64, frame_rate: f64) -> i32 {
    (frames * (BASE_UNIT / frame_rate)).round() as i32
}

/// Sub-second frame token converted to milliseconds, capped at 999.
pub fn frames_to_milliseconds_max_999(frames: f64, frame_rate: f64) -> i32 {
    frames_to_milliseconds(frames, frame_rate).min(999)
}

/// Decode a fixed-arity frame time code: `SS:FF`, `MM:SS:FF` or
/// `HH:MM:SS:FF`. Any other arity is a caller error.
pub fn decode_frame_time_code(parts: &[&str], frame_rate: f64) -> Result<TimeCode> {
    let parse = |s: &str| -> Result<i32> {
        s.trim()
            .parse()
            .map_err(|_| SubtrackError::InvalidTimeCode(s.to_string()))
    };

    match parts.len() {
        2 => Ok(TimeCode::from_components(
            0,
            0,
            parse(parts[0])?,
            frames_to_milliseconds_max_999(parse(parts[1])? as f64, frame_rate),
        )),
        3 => Ok(TimeCode::from_components(
            0,
            parse(parts[0])?,
            parse(parts[1])?,
            frames_to_milliseconds_max_999(parse(parts[2])? as f64, frame_rate),
        )),
        4 => Ok(TimeCode::from_components(
            parse(parts[0])?,
            parse(parts[1])?,
            parse(parts[2])?,
            frames_to_milliseconds_max_999(parse(parts[3])? as f64, frame_rate),
        )),
        n => Err(SubtrackError::InvalidOperation(format!(
            "frame time code must have 2-4 parts, got {}",
            n
        ))),
    }
}
