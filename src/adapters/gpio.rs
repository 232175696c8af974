//! Relay output adapters.
//!
//! Two ways to drive the relay coil through [`OutputPort`]:
//!
//! - [`GpioOutput`]: raw ESP-IDF GPIO calls on a pin number from the
//!   configuration.  On host/test it tracks the level in memory only.
//! - [`HalOutput`]: any `embedded-hal` 1.0 [`OutputPin`], for boards whose
//!   HAL already hands out configured output pins.

use embedded_hal::digital::{Error as _, OutputPin};

use crate::app::ports::{OutputError, OutputPort};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Raw GPIO ──────────────────────────────────────────────────

pub struct GpioOutput {
    pin: i32,
    configured: bool,
    level: bool,
}

impl GpioOutput {
    pub fn new(pin: i32) -> Self {
        Self {
            pin,
            configured: false,
            level: false,
        }
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Last level written.
    pub fn level(&self) -> bool {
        self.level
    }

    #[cfg(target_os = "espidf")]
    fn configure_hw(&self) -> Result<(), OutputError> {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << self.pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: `cfg` is fully initialised; the pin number was range-checked
        // by RelayConfig::validate().
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as esp_err_t {
            return Err(OutputError::ConfigFailed(ret));
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn configure_hw(&self) -> Result<(), OutputError> {
        log::debug!("gpio(sim): GPIO{} configured as output", self.pin);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn write_hw(&self, high: bool) -> Result<(), OutputError> {
        // SAFETY: gpio_set_level writes to an already-configured output pin.
        let ret = unsafe { gpio_set_level(self.pin, u32::from(high)) };
        if ret != ESP_OK as esp_err_t {
            return Err(OutputError::WriteFailed(ret));
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_hw(&self, _high: bool) -> Result<(), OutputError> {
        Ok(())
    }
}

impl OutputPort for GpioOutput {
    fn configure_output(&mut self) -> Result<(), OutputError> {
        self.configure_hw()?;
        self.configured = true;
        Ok(())
    }

    fn write(&mut self, high: bool) -> Result<(), OutputError> {
        self.write_hw(high)?;
        self.level = high;
        Ok(())
    }
}

// ── embedded-hal pin ──────────────────────────────────────────

pub struct HalOutput<P> {
    pin: P,
}

impl<P: OutputPin> HalOutput<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> OutputPort for HalOutput<P> {
    /// The HAL type already guarantees output mode.
    fn configure_output(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn write(&mut self, high: bool) -> Result<(), OutputError> {
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|e| OutputError::Hal(e.kind()))
    }
}
