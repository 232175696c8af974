//! Relaytimer firmware library.
//!
//! A single relay that can be switched on indefinitely or for a number of
//! seconds, and that survives power loss by keeping its state in NVS.
//! The pure-logic modules are exposed for integration testing; all
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod codec;
pub mod config;
pub mod error;
pub mod pins;

pub mod adapters;
pub mod drivers;
