use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Audio-CD frame rate.
pub const FRAMES_PER_SECOND: u32 = 75;

const FRAMES_PER_MINUTE: u64 = 60 * FRAMES_PER_SECOND as u64;
const NANOS_PER_SECOND: u128 = 1_000_000_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimecodeError {
    #[error("timecode must be in MM:SS:FF format")]
    InvalidFormat,

    #[error("invalid {field} value: {value}")]
    InvalidField { field: &'static str, value: String },

    #[error("seconds value cannot exceed 59: {0}")]
    SecondsOutOfRange(u32),

    #[error("frames value must be less than {max}: {0}", max = FRAMES_PER_SECOND)]
    FramesOutOfRange(u32),
}

/// A `MM:SS:FF` position at 75 frames per second.
///
/// Fields are not range checked on construction; `FromStr` is the validating path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Timecode {
    pub minutes: u64,
    pub seconds: u32,
    pub frames: u32,
}

impl Timecode {
    pub const ZERO: Timecode = Timecode {
        minutes: 0,
        seconds: 0,
        frames: 0,
    };

    pub const fn new(minutes: u64, seconds: u32, frames: u32) -> Self {
        Self {
            minutes,
            seconds,
            frames,
        }
    }

    /// Builds a canonical timecode from a frame count. Negative counts clamp to zero.
    pub fn from_frames(total_frames: i64) -> Self {
        let total = total_frames.max(0) as u64;
        let minutes = total / FRAMES_PER_MINUTE;
        let rest = total % FRAMES_PER_MINUTE;

        Self {
            minutes,
            seconds: (rest / FRAMES_PER_SECOND as u64) as u32,
            frames: (rest % FRAMES_PER_SECOND as u64) as u32,
        }
    }

    /// Exact for every timecode built by `from_frames`; saturates at `u64::MAX` otherwise.
    pub fn total_frames(&self) -> u64 {
        u64::try_from(self.wide_frames()).unwrap_or(u64::MAX)
    }

    /// Real time of the position, saturating at `Duration::MAX`.
    pub fn to_duration(&self) -> Duration {
        // Scale to nanoseconds before dividing, 1s / 75 is not an integer.
        let nanos = self.wide_frames() * NANOS_PER_SECOND / FRAMES_PER_SECOND as u128;
        let sub_nanos = (nanos % NANOS_PER_SECOND) as u32;
        match u64::try_from(nanos / NANOS_PER_SECOND) {
            Ok(secs) => Duration::new(secs, sub_nanos),
            Err(_) => Duration::MAX,
        }
    }

    fn wide_frames(&self) -> u128 {
        self.minutes as u128 * FRAMES_PER_MINUTE as u128
            + self.seconds as u128 * FRAMES_PER_SECOND as u128
            + self.frames as u128
    }
}

pub fn timecode_from_frame_count(total_frames: i64) -> Timecode {
    Timecode::from_frames(total_frames)
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.minutes, self.seconds, self.frames
        )
    }
}

impl FromStr for Timecode {
    type Err = TimecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 {
            return Err(TimecodeError::InvalidFormat);
        }

        let minutes: u64 = parse_field("minutes", parts[0])?;

        let seconds: u32 = parse_field("seconds", parts[1])?;
        if seconds > 59 {
            return Err(TimecodeError::SecondsOutOfRange(seconds));
        }

        let frames: u32 = parse_field("frames", parts[2])?;
        if frames >= FRAMES_PER_SECOND {
            return Err(TimecodeError::FramesOutOfRange(frames));
        }

        Ok(Self::new(minutes, seconds, frames))
    }
}

fn parse_field<T: FromStr>(field: &'static str, value: &str) -> Result<T, TimecodeError> {
    value.parse().map_err(|_| TimecodeError::InvalidField {
        field,
        value: value.to_string(),
    })
}

impl Serialize for Timecode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
