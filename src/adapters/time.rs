//! Wall-clock adapter.
//!
//! - **`target_os = "espidf"`**: reads `gettimeofday()`.  The RTC starts at
//!   the epoch on power-up and only becomes meaningful once SNTP (or the host
//!   application) sets it, so anything before 2020-01-01 reports
//!   unavailable.
//! - **`not(target_os = "espidf")`**: uses `std::time::SystemTime` for
//!   host-side testing and simulation.

use crate::app::ports::ClockPort;

/// Instants before 2020-01-01T00:00:00Z are treated as "not synchronised".
pub const EPOCH_2020: i64 = 1_577_836_800;

pub struct SystemClock;

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self
    }

    #[cfg(target_os = "espidf")]
    fn raw_now() -> Option<i64> {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        // SAFETY: `tv` is a valid out-parameter; the timezone argument may be null.
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return None;
        }
        Some(tv.tv_sec as i64)
    }

    #[cfg(not(target_os = "espidf"))]
    fn raw_now() -> Option<i64> {
        let elapsed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .ok()?;
        i64::try_from(elapsed.as_secs()).ok()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> Option<i64> {
        Self::raw_now().filter(|&secs| is_synchronised(secs))
    }
}

/// Whether `secs` looks like a set wall clock rather than time since boot.
pub fn is_synchronised(secs: i64) -> bool {
    secs >= EPOCH_2020
}
