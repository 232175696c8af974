//! GPIO pin assignments for the relay board.
//!
//! Single source of truth: drivers and the default configuration reference
//! this module rather than hard-coding pin numbers.

/// Digital output to the relay driver transistor (active HIGH).
pub const RELAY_GPIO: i32 = 5;

/// Highest GPIO number on the ESP32-S3.
pub const MAX_GPIO: i32 = 48;
