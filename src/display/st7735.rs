//! ST7735 TFT controller driver.
//!
//! 128x160 RGB565 panel driven over SPI with a DC line.
//! Drawing is immediate: every primitive programs an addressing window and
//! streams the matching number of color samples. The controller's write
//! cursor auto-increments across columns, then rows.
//!
//! Initialization sequence follows the ST7735R "red tab" reference values.

use super::command::Command;
use super::graphics::Panel;
use super::interface::{DisplayInterface, TransportError};
use thiserror::Error;

/// Each of the three hard reset phases
const RESET_PHASE_MS: u32 = 500;

const GAMMA_POSITIVE: [u8; 16] = [
    0x02, 0x1C, 0x07, 0x12, 0x37, 0x32, 0x29, 0x2D, 0x29, 0x25, 0x2B, 0x39, 0x00, 0x01, 0x03, 0x10,
];
const GAMMA_NEGATIVE: [u8; 16] = [
    0x03, 0x1D, 0x07, 0x06, 0x2E, 0x2C, 0x29, 0x2D, 0x2E, 0x2E, 0x37, 0x3F, 0x00, 0x00, 0x02, 0x10,
];

/// Panel orientation, selected once at init
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// 160x128
    Landscape,
    /// 128x160
    Portrait,
}

impl Orientation {
    /// MADCTL byte
    pub fn memory_access(self) -> u8 {
        match self {
            Orientation::Landscape => 0xA0,
            Orientation::Portrait => 0x00,
        }
    }

    /// (width, height) in pixels
    pub fn dimensions(self) -> (u16, u16) {
        match self {
            Orientation::Landscape => (160, 128),
            Orientation::Portrait => (128, 160),
        }
    }
}

impl From<u8> for Orientation {
    /// 0 is landscape, anything else portrait
    fn from(value: u8) -> Self {
        match value {
            0 => Orientation::Landscape,
            _ => Orientation::Portrait,
        }
    }
}

/// Controller lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Resetting,
    ConfiguringPanel,
    NormalOn,
}

/// Display driver errors
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Display not initialized")]
    NotInitialized,
}

impl DisplayError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DisplayError::Transport(TransportError::Timeout { .. }))
    }
}

/// ST7735 display driver
pub struct St7735<I> {
    interface: I,
    state: ControllerState,
    power_on: bool,
    inverted: bool,
    backlight_on: bool,
    margin_row: u16,
    margin_col: u16,
    width: u16,
    height: u16,
}

impl<I: DisplayInterface> St7735<I> {
    /// Take ownership of the transport. Nothing is sent until [`init`](Self::init).
    pub fn new(interface: I) -> Self {
        Self {
            interface,
            state: ControllerState::Uninitialized,
            power_on: true,
            inverted: false,
            backlight_on: true,
            margin_row: 0,
            margin_col: 0,
            width: 0,
            height: 0,
        }
    }

    /// Offsets added to every addressed row and column
    pub fn with_margins(mut self, margin_row: u16, margin_col: u16) -> Self {
        self.margin_row = margin_row;
        self.margin_col = margin_col;
        self
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Hard reset and configure the panel
    ///
    /// Geometry is set from `orientation`. Safe to call again; the whole
    /// sequence is replayed from the reset pulse. Nothing is read back, so a
    /// wiring fault shows up as a blank panel rather than an error.
    pub fn init(&mut self, orientation: Orientation) -> Result<(), DisplayError> {
        tracing::info!("Initializing ST7735 ({:?})", orientation);

        self.state = ControllerState::Resetting;
        self.hard_reset();

        self.state = ControllerState::ConfiguringPanel;
        self.configure_panel(orientation)?;

        // Display on
        self.send_command(Command::DisplayOn)?;
        self.interface.delay_ms(100);

        self.state = ControllerState::NormalOn;
        tracing::info!("Display initialized ({}x{})", self.width, self.height);

        Ok(())
    }

    /// Reset pulse: high, low, high with a fixed wait after each edge
    fn hard_reset(&mut self) {
        tracing::debug!("Performing hardware reset");

        self.interface.set_reset(true);
        self.interface.delay_ms(RESET_PHASE_MS);

        self.interface.set_reset(false);
        self.interface.delay_ms(RESET_PHASE_MS);

        self.interface.set_reset(true);
        self.interface.delay_ms(RESET_PHASE_MS);
    }

    fn configure_panel(&mut self, orientation: Orientation) -> Result<(), DisplayError> {
        // Software reset, then wake from sleep
        self.send_command(Command::SoftwareReset)?;
        self.interface.delay_ms(150);
        self.send_command(Command::SleepOut)?;
        self.interface.delay_ms(255);

        // Frame rate: normal, idle, partial
        self.send_command_data(Command::FrameRateNormal, &[0x01, 0x2C, 0x2D])?;
        self.send_command_data(
            Command::FrameRateIdle,
            &[0x01, 0x2C, 0x2D, 0x01, 0x2C, 0x2D],
        )?;
        self.send_command_data(
            Command::FrameRatePartial,
            &[0x01, 0x2C, 0x2D, 0x01, 0x2C, 0x2D],
        )?;
        self.interface.delay_ms(10);

        // Column inversion in all modes
        self.send_command_data(Command::InversionControl, &[0x07])?;

        // Power: AVDD/GVDD, VGH/VGL, op-amp currents per mode, VCOM
        self.send_command_data(Command::PowerControl1, &[0xA2, 0x02, 0x84])?;
        self.send_command_data(Command::PowerControl2, &[0xC5])?;
        self.send_command_data(Command::PowerControl3, &[0x8A, 0x00])?;
        self.send_command_data(Command::PowerControl4, &[0x8A, 0x2A])?;
        self.send_command_data(Command::PowerControl5, &[0x8A, 0xEE])?;
        self.send_command_data(Command::VcomControl, &[0x0E])?;

        self.send_command(Command::InversionOff)?;

        // Orientation decides geometry
        self.send_command_data(Command::MemoryAccessControl, &[orientation.memory_access()])?;
        (self.width, self.height) = orientation.dimensions();

        // 16-bit color
        self.send_command_data(Command::PixelFormat, &[0x05])?;

        // Full panel address range
        self.send_command_data(Command::ColumnAddressSet, &[0x00, 0x01, 0x00, 0x7F])?;
        self.send_command_data(Command::RowAddressSet, &[0x00, 0x01, 0x00, 0x9F])?;

        self.send_command_data(Command::GammaPositive, &GAMMA_POSITIVE)?;
        self.send_command_data(Command::GammaNegative, &GAMMA_NEGATIVE)?;

        self.send_command(Command::NormalMode)?;
        self.interface.delay_ms(10);

        Ok(())
    }

    /// Program the addressing window and arm a memory write
    ///
    /// The caller must follow with exactly `(x1-x0+1)*(y1-y0+1)` samples and no
    /// other command, or the controller's cursor drifts until the next window.
    pub fn program_window(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> Result<(), DisplayError> {
        tracing::trace!("Window ({}, {})-({}, {})", x0, y0, x1, y1);

        let rows = address_range(y0, y1, self.margin_row);
        self.send_command_data(Command::RowAddressSet, &rows)?;

        let columns = address_range(x0, x1, self.margin_col);
        self.send_command_data(Command::ColumnAddressSet, &columns)?;

        self.send_command(Command::MemoryWrite)
    }

    /// Stream `count` copies of `color` into the armed window
    pub fn stream_pixels(&mut self, count: usize, color: u16) -> Result<(), DisplayError> {
        if count == 0 {
            return Ok(());
        }
        self.interface.send_pixels(color, count)?;
        Ok(())
    }

    /// Write one row of individually colored pixels starting at `(x, y)`
    ///
    /// The row is cut at the right edge.
    pub fn blit_row(&mut self, x: u16, y: u16, row: &[u16]) -> Result<(), DisplayError> {
        self.ensure_ready()?;
        if !self.in_bounds(x, y) || row.is_empty() {
            return Ok(());
        }

        let len = row.len().min((self.width - x) as usize);
        self.program_window(x, y, x + len as u16 - 1, y)?;
        self.interface.send_pixel_run(&row[..len])?;
        Ok(())
    }

    /// Write consecutive rows downward from `(x, y)`, stopping at the bottom edge
    ///
    /// Rows are pulled lazily, so a decoder can produce them one at a time.
    pub fn draw_rows<R, T>(&mut self, x: u16, y: u16, rows: R) -> Result<(), DisplayError>
    where
        R: IntoIterator<Item = T>,
        T: AsRef<[u16]>,
    {
        self.ensure_ready()?;

        let mut row_y = y;
        for row in rows {
            if row_y >= self.height {
                break;
            }
            self.blit_row(x, row_y, row.as_ref())?;
            row_y += 1;
        }
        Ok(())
    }

    fn ensure_ready(&self) -> Result<(), DisplayError> {
        if self.state != ControllerState::NormalOn {
            return Err(DisplayError::NotInitialized);
        }
        Ok(())
    }

    fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    fn send_command(&mut self, command: Command) -> Result<(), DisplayError> {
        self.interface.send_command(command.into())?;
        Ok(())
    }

    fn send_command_data(&mut self, command: Command, data: &[u8]) -> Result<(), DisplayError> {
        self.send_command(command)?;
        self.interface.send_data(data)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }
}

/// Start/end address pair, big-endian
fn address_range(start: u16, end: u16, margin: u16) -> [u8; 4] {
    let [s_hi, s_lo] = start.wrapping_add(margin).to_be_bytes();
    let [e_hi, e_lo] = end.wrapping_add(margin).to_be_bytes();
    [s_hi, s_lo, e_hi, e_lo]
}

impl<I: DisplayInterface> Panel for St7735<I> {
    type Error = DisplayError;

    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn power(&mut self, value: Option<bool>) -> Result<bool, DisplayError> {
        if let Some(on) = value {
            let command = if on { Command::DisplayOn } else { Command::DisplayOff };
            self.send_command(command)?;
            self.power_on = on;
            tracing::info!("Display power {}", if on { "ON" } else { "OFF" });
        }
        Ok(self.power_on)
    }

    fn inverted(&mut self, value: Option<bool>) -> Result<bool, DisplayError> {
        if let Some(inverted) = value {
            let command = if inverted {
                Command::InversionOn
            } else {
                Command::InversionOff
            };
            self.send_command(command)?;
            self.inverted = inverted;
            tracing::info!("Display inversion {}", if inverted { "ON" } else { "OFF" });
        }
        Ok(self.inverted)
    }

    fn backlight(&mut self, value: Option<bool>) -> Result<bool, DisplayError> {
        if let Some(on) = value {
            self.interface.set_backlight(on);
            self.backlight_on = on;
        }
        Ok(self.backlight_on)
    }

    /// Single pixel
    ///
    /// The window spans two columns and two rows while only one sample is
    /// sent; the next primitive reprograms the window before writing.
    fn pixel(&mut self, x: u16, y: u16, color: u16) -> Result<(), DisplayError> {
        self.ensure_ready()?;
        if !self.in_bounds(x, y) {
            return Ok(());
        }
        self.program_window(x, y, x + 1, y + 1)?;
        self.stream_pixels(1, color)
    }

    fn hline(&mut self, x: u16, y: u16, w: u16, color: u16) -> Result<(), DisplayError> {
        self.ensure_ready()?;
        if !self.in_bounds(x, y) || w == 0 {
            return Ok(());
        }
        self.program_window(x, y, x.saturating_add(w - 1), y)?;
        self.stream_pixels(w as usize, color)
    }

    fn vline(&mut self, x: u16, y: u16, h: u16, color: u16) -> Result<(), DisplayError> {
        self.ensure_ready()?;
        if !self.in_bounds(x, y) || h == 0 {
            return Ok(());
        }
        let h = h.min(self.height - y);
        self.program_window(x, y, x, y + h - 1)?;
        self.stream_pixels(h as usize, color)
    }

    fn rect(&mut self, x: u16, y: u16, w: u16, h: u16, color: u16) -> Result<(), DisplayError> {
        self.ensure_ready()?;
        if !self.in_bounds(x, y) || w == 0 || h == 0 {
            return Ok(());
        }
        let w = w.min(self.width - x);
        let h = h.min(self.height - y);
        self.program_window(x, y, x + w - 1, y + h - 1)?;
        self.stream_pixels(w as usize * h as usize, color)
    }
}
