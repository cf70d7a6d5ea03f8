//! GPIO controller for the TFT panel.
//!
//! Manages the control lines next to the SPI bus:
//! - DC (Data/Command select)
//! - RST (Reset, active low)
//! - BL (Backlight enable)
//! - CS (optional software chip-select)
//!
//! Pin numbers come from [`WiringConfig`] (BCM numbering).
//!
//! Pins keep their last level when the controller is dropped, so an image
//! drawn by a one-shot command stays lit after the process exits. Blanking is
//! explicit through [`GpioController::set_backlight`].

use crate::config::WiringConfig;
use rppal::gpio::{Gpio, OutputPin};
use thiserror::Error;

/// GPIO-related errors
#[derive(Error, Debug)]
pub enum GpioError {
    #[error("GPIO initialization failed: {0}")]
    InitError(#[from] rppal::gpio::Error),
}

/// GPIO controller for the panel's control lines
pub struct GpioController {
    rst: OutputPin,
    dc: OutputPin,
    bl: OutputPin,
    cs: Option<OutputPin>,
}

impl GpioController {
    /// Acquire the configured control pins
    pub fn new(wiring: &WiringConfig) -> Result<Self, GpioError> {
        let gpio = Gpio::new()?;

        let mut rst = gpio.get(wiring.rst_pin)?.into_output();
        let mut dc = gpio.get(wiring.dc_pin)?.into_output();
        let mut bl = gpio.get(wiring.backlight_pin)?.into_output();
        let cs = match wiring.cs_pin {
            Some(pin) => {
                let mut cs = gpio.get(pin)?.into_output();
                cs.set_high();
                cs.set_reset_on_drop(false);
                Some(cs)
            }
            None => None,
        };

        // rppal restores the previous pin mode on drop by default, which
        // would float RST and the backlight enable
        rst.set_reset_on_drop(false);
        dc.set_reset_on_drop(false);
        bl.set_reset_on_drop(false);

        // Known state: out of reset, command mode, backlight lit
        rst.set_high();
        dc.set_low();
        bl.set_high();

        tracing::debug!(
            "GPIO initialized: DC={}, RST={}, BL={}, CS={:?}",
            wiring.dc_pin,
            wiring.rst_pin,
            wiring.backlight_pin,
            wiring.cs_pin
        );

        Ok(Self { rst, dc, bl, cs })
    }

    /// Drive the reset line
    #[inline]
    pub fn set_reset(&mut self, high: bool) {
        if high {
            self.rst.set_high();
        } else {
            self.rst.set_low();
        }
    }

    /// Set DC pin low (command mode)
    #[inline]
    pub fn dc_low(&mut self) {
        self.dc.set_low();
    }

    /// Set DC pin high (data mode)
    #[inline]
    pub fn dc_high(&mut self) {
        self.dc.set_high();
    }

    /// Assert the software chip-select, if one is wired
    #[inline]
    pub fn select(&mut self) {
        if let Some(cs) = self.cs.as_mut() {
            cs.set_low();
        }
    }

    /// Release the software chip-select, if one is wired
    #[inline]
    pub fn deselect(&mut self) {
        if let Some(cs) = self.cs.as_mut() {
            cs.set_high();
        }
    }

    /// Switch the backlight
    pub fn set_backlight(&mut self, on: bool) {
        tracing::debug!("Backlight {}", if on { "ON" } else { "OFF" });
        if on {
            self.bl.set_high();
        } else {
            self.bl.set_low();
        }
    }
}

impl Drop for GpioController {
    fn drop(&mut self) {
        self.deselect();
        tracing::debug!("GPIO controller released, pins left driven");
    }
}
