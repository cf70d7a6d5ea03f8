//! Bus framing for the ST7735.
//!
//! [`DisplayInterface`] is the seam between the driver and the wires. Each
//! method is one bus scope: chip-select is asserted on entry and released on
//! every exit path, including errors.
//!
//! [`HardwareInterface`] implements it on top of `rppal` SPI and GPIO.

use super::gpio::{GpioController, GpioError};
use super::spi::{SpiDisplay, SpiError};
use crate::config::WiringConfig;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Transport errors
///
/// A timeout is not retried. The controller's write cursor may be left
/// mid-window; the next drawing call must program a fresh window.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Transport timeout: transfer did not complete within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("SPI error: {0}")]
    Spi(SpiError),

    #[error("GPIO error: {0}")]
    Gpio(#[from] GpioError),
}

impl From<SpiError> for TransportError {
    fn from(err: SpiError) -> Self {
        match err {
            SpiError::Timeout { timeout_ms } => TransportError::Timeout { timeout_ms },
            other => TransportError::Spi(other),
        }
    }
}

/// Low-level access to the panel controller
pub trait DisplayInterface {
    /// DC low, one command byte
    fn send_command(&mut self, command: u8) -> Result<(), TransportError>;

    /// DC high, the whole slice as one contiguous transfer
    fn send_data(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// DC high, `count` big-endian copies of `color` within one chip-select scope
    fn send_pixels(&mut self, color: u16, count: usize) -> Result<(), TransportError>;

    /// DC high, each color big-endian within one chip-select scope
    fn send_pixel_run(&mut self, colors: &[u16]) -> Result<(), TransportError>;

    /// Drive the reset line. DC is held low while reset is driven.
    fn set_reset(&mut self, high: bool);

    /// Switch the backlight line
    fn set_backlight(&mut self, on: bool);

    /// Block for a fixed interval
    fn delay_ms(&mut self, ms: u32);
}

/// `rppal`-backed interface
pub struct HardwareInterface {
    gpio: GpioController,
    spi: SpiDisplay,
}

impl HardwareInterface {
    /// Claim the pins and open the SPI bus described by `wiring`
    pub fn new(
        wiring: &WiringConfig,
        transfer_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let gpio = GpioController::new(wiring)?;
        let spi = SpiDisplay::new(wiring, transfer_timeout)?;
        Ok(Self { gpio, spi })
    }

    /// Run `transfer` with chip-select asserted, releasing it afterwards
    fn selected<F>(&mut self, transfer: F) -> Result<(), TransportError>
    where
        F: FnOnce(&mut SpiDisplay) -> Result<(), SpiError>,
    {
        self.gpio.select();
        let result = transfer(&mut self.spi);
        self.gpio.deselect();
        result.map_err(TransportError::from)
    }
}

impl DisplayInterface for HardwareInterface {
    fn send_command(&mut self, command: u8) -> Result<(), TransportError> {
        self.gpio.dc_low();
        self.selected(|spi| spi.write(&[command]))
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.gpio.dc_high();
        self.selected(|spi| spi.write(data))
    }

    fn send_pixels(&mut self, color: u16, count: usize) -> Result<(), TransportError> {
        self.gpio.dc_high();
        self.selected(|spi| spi.write_repeated(color.to_be_bytes(), count))
    }

    fn send_pixel_run(&mut self, colors: &[u16]) -> Result<(), TransportError> {
        let bytes: Vec<u8> = colors.iter().flat_map(|c| c.to_be_bytes()).collect();
        self.gpio.dc_high();
        self.selected(|spi| spi.write(&bytes))
    }

    fn set_reset(&mut self, high: bool) {
        self.gpio.dc_low();
        self.gpio.set_reset(high);
    }

    fn set_backlight(&mut self, on: bool) {
        self.gpio.set_backlight(on);
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}
