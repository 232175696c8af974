//! Text encoding of the persisted on/off schedule.
//!
//! ```text
//! 2024-05-01 18:30:00,2024-05-01 19:00:00
//! └──── on-time ────┘ └──── off-time ───┘
//! ```
//!
//! Timestamps are UTC, fixed width (19 bytes).  Decoding is strict: anything
//! that is not exactly two such timestamps around a single comma is an error,
//! and the caller treats it as "no schedule".

use core::fmt::Write;

use chrono::{DateTime, NaiveDateTime, Timelike};

use crate::app::state::Schedule;
use crate::error::ScheduleError;

/// `strftime` pattern of one timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Byte length of one formatted timestamp.
pub const TIMESTAMP_LEN: usize = 19;

/// Separator between on-time and off-time.
pub const SEPARATOR: char = ',';

pub type TimestampString = heapless::String<TIMESTAMP_LEN>;
pub type ScheduleString = heapless::String<{ 2 * TIMESTAMP_LEN + 1 }>;

/// Format `secs` since the epoch as `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn format_timestamp(secs: i64) -> Result<TimestampString, ScheduleError> {
    let dt = DateTime::from_timestamp(secs, 0).ok_or(ScheduleError::OutOfRange)?;
    let mut out = TimestampString::new();
    // Years outside 0000..=9999 do not fit the fixed width and fail here.
    write!(out, "{}", dt.format(TIMESTAMP_FORMAT)).map_err(|_| ScheduleError::OutOfRange)?;
    if out.len() != TIMESTAMP_LEN {
        return Err(ScheduleError::OutOfRange);
    }
    Ok(out)
}

/// Parse exactly one fixed-width `YYYY-MM-DD HH:MM:SS` timestamp (UTC).
pub fn parse_timestamp(text: &str) -> Result<i64, ScheduleError> {
    if !has_timestamp_shape(text.as_bytes()) {
        return Err(ScheduleError::InvalidTimestamp);
    }
    let naive = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .map_err(|_| ScheduleError::InvalidTimestamp)?;
    // chrono accepts `:60` as a leap second; it has no epoch-second of its own.
    if naive.nanosecond() != 0 {
        return Err(ScheduleError::InvalidTimestamp);
    }
    Ok(naive.and_utc().timestamp())
}

/// `DDDD-DD-DD DD:DD:DD`, digits and punctuation in fixed positions.
fn has_timestamp_shape(bytes: &[u8]) -> bool {
    bytes.len() == TIMESTAMP_LEN
        && bytes.iter().enumerate().all(|(i, &b)| match i {
            4 | 7 => b == b'-',
            10 => b == b' ',
            13 | 16 => b == b':',
            _ => b.is_ascii_digit(),
        })
}

pub fn encode_schedule(schedule: &Schedule) -> Result<ScheduleString, ScheduleError> {
    let on = format_timestamp(schedule.on_time)?;
    let off = format_timestamp(schedule.off_time)?;
    let mut out = ScheduleString::new();
    write!(out, "{on}{SEPARATOR}{off}").map_err(|_| ScheduleError::OutOfRange)?;
    Ok(out)
}

/// Split at the first comma and parse both halves.
pub fn decode_schedule(text: &str) -> Result<Schedule, ScheduleError> {
    let (on, off) = text
        .split_once(SEPARATOR)
        .ok_or(ScheduleError::MissingSeparator)?;
    let schedule = Schedule {
        on_time: parse_timestamp(on)?,
        off_time: parse_timestamp(off)?,
    };
    if schedule.off_time < schedule.on_time {
        return Err(ScheduleError::Inverted);
    }
    Ok(schedule)
}
