//! Relay state and the timed activation window.

/// A bounded activation: when it began and when it must end, in seconds
/// since the Unix epoch.
///
/// On-time and off-time only exist as a pair, so an indefinite activation or
/// an off relay simply has no `Schedule`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub on_time: i64,
    pub off_time: i64,
}

impl Schedule {
    /// Window of `seconds` starting at `now`. Saturates at `i64::MAX`.
    pub fn starting_at(now: i64, seconds: u32) -> Self {
        Self {
            on_time: now,
            off_time: now.saturating_add(i64::from(seconds)),
        }
    }

    /// `now` is strictly after the off-time.
    pub fn is_past(&self, now: i64) -> bool {
        now > self.off_time
    }

    /// `now` has reached the off-time.
    pub fn is_due(&self, now: i64) -> bool {
        now >= self.off_time
    }

    /// Seconds left until the off-time, zero once due.
    pub fn remaining_secs(&self, now: i64) -> u64 {
        self.off_time.saturating_sub(now).max(0) as u64
    }
}

/// The three observable relay states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Off,
    OnIndefinite,
    OnTimed(Schedule),
}

impl RelayState {
    pub fn is_on(&self) -> bool {
        !matches!(self, Self::Off)
    }
}
