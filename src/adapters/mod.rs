//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter | Implements  | Connects to                         |
//! |---------|-------------|-------------------------------------|
//! | `gpio`  | OutputPort  | ESP32 GPIO / any embedded-hal pin   |
//! | `nvs`   | StoragePort | NVS / in-memory store               |
//! |         | ConfigPort  |                                     |
//! | `time`  | ClockPort   | ESP32 RTC (set by SNTP) / host time |

pub mod gpio;
pub mod nvs;
pub mod time;
