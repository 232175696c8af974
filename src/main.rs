//! Relaytimer firmware entry point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                Adapters (outer ring)                   │
//! │                                                        │
//! │   GpioOutput        SystemClock        NvsAdapter      │
//! │   (OutputPort)      (ClockPort)        (Storage+Cfg)   │
//! │                                                        │
//! │   ──────────── Port Trait Boundary ─────────────       │
//! │                                                        │
//! │   ┌────────────────────────────────────────────┐       │
//! │   │        RelayController (pure logic)        │       │
//! │   │  OFF · ON_INDEFINITE · ON_TIMED            │       │
//! │   └────────────────────────────────────────────┘       │
//! │                                                        │
//! │   Watchdog (fed every loop iteration)                  │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! Wall-clock synchronisation (SNTP) belongs to the host application; until
//! it happens, timed activations are anchored at epoch 0.
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use relaytimer::adapters::gpio::GpioOutput;
use relaytimer::adapters::nvs::NvsAdapter;
use relaytimer::adapters::time::SystemClock;
use relaytimer::app::ports::ConfigPort;
use relaytimer::app::relay::RelayController;
use relaytimer::config::RelayConfig;
use relaytimer::drivers::watchdog::Watchdog;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("Relaytimer v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => {
            warn!("NVS init failed ({}), relay state will not persist", e);
            NvsAdapter::without_init()
        }
    };
    let config = match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            RelayConfig::default()
        }
    };

    // ── 3. Construct the relay ────────────────────────────────
    let identity = config.identity()?;
    let mut relay = RelayController::new(
        identity,
        GpioOutput::new(config.pin),
        SystemClock::new(),
        &nvs,
    );
    relay.setup();
    if relay.relay_state().is_on() {
        info!("Relay {} resumed on after restart", relay.identity());
    }

    let watchdog = Watchdog::new(config.watchdog_timeout_ms);
    let tick = Duration::from_millis(u64::from(config.poll_interval_ms));

    info!("System ready. Entering control loop.");

    // ── 4. Control loop ───────────────────────────────────────
    loop {
        relay.poll();
        watchdog.feed();
        std::thread::sleep(tick);
    }
}
