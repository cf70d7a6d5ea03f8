//! Display module for TFT panel control.
//!
//! This module provides the ST7735 driver, its SPI/GPIO transport and the
//! drawing surface built on top of it.

pub mod color;
pub mod command;
pub mod font;
pub mod gpio;
pub mod graphics;
pub mod interface;
pub mod spi;
pub mod st7735;

// Re-export main types
pub use graphics::Panel;
pub use interface::HardwareInterface;
pub use st7735::{DisplayError, Orientation, St7735};

use crate::config::Config;
use font::GlyphStyle;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

type Driver = St7735<HardwareInterface>;

/// Thread-safe display controller wrapper
///
/// The driver lives behind one async mutex, so no two callers can interleave
/// their bus scopes.
pub struct DisplayController {
    display: Arc<Mutex<Option<Driver>>>,
    config: Config,
}

impl DisplayController {
    /// Create a new display controller (uninitialized)
    pub fn new(config: Config) -> Self {
        Self {
            display: Arc::new(Mutex::new(None)),
            config,
        }
    }

    /// Open the hardware and run the init sequence
    pub async fn init(&self) -> Result<(), DisplayError> {
        let mut display_guard = self.display.lock().await;

        if display_guard.is_some() {
            tracing::debug!("Display already initialized");
            return Ok(());
        }

        let interface = HardwareInterface::new(
            &self.config.wiring,
            Duration::from_millis(self.config.transfer_timeout_ms),
        )?;
        let mut tft = St7735::new(interface)
            .with_margins(self.config.margin_row, self.config.margin_col);
        tft.init(Orientation::from(self.config.orientation))?;
        tracing::debug!("Controller state: {:?}", tft.state());

        *display_guard = Some(tft);
        Ok(())
    }

    /// Run `f` against the initialized driver
    async fn with_display<F, R>(&self, f: F) -> Result<R, DisplayError>
    where
        F: FnOnce(&mut Driver) -> Result<R, DisplayError>,
    {
        let mut display_guard = self.display.lock().await;

        let display = display_guard
            .as_mut()
            .ok_or(DisplayError::NotInitialized)?;

        f(display)
    }

    /// Fill the panel with one color
    pub async fn clear(&self, color: u16) -> Result<(), DisplayError> {
        let (r, g, b) = color::unpack_color(color);
        tracing::info!("Clearing display to {:#06x} (rgb {}, {}, {})", color, r, g, b);
        self.with_display(|tft| tft.clear(color)).await
    }

    /// Show test pattern
    pub async fn test_pattern(&self) -> Result<(), DisplayError> {
        self.init().await?;
        self.with_display(|tft| graphics::draw_test_pattern(tft)).await
    }

    /// Clear to `background` and draw `text` from the top-left corner
    pub async fn show_text(
        &self,
        text: &str,
        color: u16,
        background: u16,
    ) -> Result<(), DisplayError> {
        self.with_display(|tft| {
            tft.clear(background)?;
            tft.draw_text(2, 2, text, color, Some(background))
        })
        .await
    }

    /// Draw status lines; the first one is scaled up as a title
    pub async fn show_status(
        &self,
        lines: &[String],
        color: u16,
        background: u16,
    ) -> Result<(), DisplayError> {
        self.with_display(|tft| {
            tft.clear(background)?;

            let mut y = 4;
            let mut lines = lines.iter();
            if let Some(title) = lines.next() {
                let style = GlyphStyle::scaled(2, 2);
                for (i, ch) in title.chars().enumerate() {
                    let x = 4 + i as u16 * font::ADVANCE * 2;
                    tft.draw_glyph(x, y, ch, color, style)?;
                }
                y += font::LINE_HEIGHT * 2 + 4;
            }
            for line in lines {
                tft.draw_text(4, y, line, color, Some(background))?;
                y += font::LINE_HEIGHT;
            }
            Ok(())
        })
        .await
    }

    /// Stream image rows to the panel as they are produced
    pub async fn show_rows<R>(&self, x: u16, y: u16, rows: R) -> Result<(), DisplayError>
    where
        R: IntoIterator<Item = Vec<u16>>,
    {
        self.with_display(|tft| tft.draw_rows(x, y, rows)).await
    }

    /// Panel geometry, once initialized
    pub async fn dimensions(&self) -> Option<(u16, u16)> {
        let display_guard = self.display.lock().await;
        display_guard.as_ref().map(|tft| (tft.width(), tft.height()))
    }

    /// Turn the panel output and backlight off and release the hardware
    pub async fn sleep(&self) -> Result<(), DisplayError> {
        let mut display_guard = self.display.lock().await;

        if let Some(display) = display_guard.as_mut() {
            tracing::info!("Putting display to sleep");
            display.power(Some(false))?;
            display.backlight(Some(false))?;
            *display_guard = None;
        }

        Ok(())
    }
}

impl Clone for DisplayController {
    fn clone(&self) -> Self {
        Self {
            display: Arc::clone(&self.display),
            config: self.config.clone(),
        }
    }
}
