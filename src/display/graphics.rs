//! Drawing surface of the panel.
//!
//! [`Panel`] exposes the device controls and the fill primitives a driver
//! must implement. Lines, text and clearing are provided on top of them.

use super::color;
use super::font::{self, GlyphStyle};

/// Drawing and control surface of a TFT panel
///
/// Coordinates are device-relative. Primitives whose start point lies outside
/// the panel draw nothing and succeed.
pub trait Panel {
    type Error;

    /// Width in pixels for the current orientation
    fn width(&self) -> u16;

    /// Height in pixels for the current orientation
    fn height(&self) -> u16;

    /// Query (`None`) or switch (`Some`) the display output. Returns the cached state.
    fn power(&mut self, value: Option<bool>) -> Result<bool, Self::Error>;

    /// Query (`None`) or switch (`Some`) color inversion. Returns the cached state.
    fn inverted(&mut self, value: Option<bool>) -> Result<bool, Self::Error>;

    /// Query (`None`) or switch (`Some`) the backlight. Returns the cached state.
    fn backlight(&mut self, value: Option<bool>) -> Result<bool, Self::Error>;

    fn pixel(&mut self, x: u16, y: u16, color: u16) -> Result<(), Self::Error>;

    fn hline(&mut self, x: u16, y: u16, w: u16, color: u16) -> Result<(), Self::Error>;

    /// Vertical run of `h` pixels, clamped to the bottom edge
    fn vline(&mut self, x: u16, y: u16, h: u16, color: u16) -> Result<(), Self::Error>;

    /// Filled rectangle, clamped to the right and bottom edges
    fn rect(&mut self, x: u16, y: u16, w: u16, h: u16, color: u16) -> Result<(), Self::Error>;

    /// Line between two points, inclusive of both
    ///
    /// Axis-aligned lines become a single [`hline`](Panel::hline) or
    /// [`vline`](Panel::vline) starting at the lower endpoint. Anything else is
    /// walked with [`Bresenham`] and plotted pixel by pixel.
    fn line(&mut self, x0: u16, y0: u16, x1: u16, y1: u16, color: u16) -> Result<(), Self::Error> {
        if x0 == x1 {
            let len = y0.abs_diff(y1).saturating_add(1);
            return self.vline(x0, y0.min(y1), len, color);
        }
        if y0 == y1 {
            let len = x0.abs_diff(x1).saturating_add(1);
            return self.hline(x0.min(x1), y0, len, color);
        }

        for (x, y) in Bresenham::new(x0, y0, x1, y1) {
            self.pixel(x, y, color)?;
        }
        Ok(())
    }

    /// Fill the whole panel
    fn clear(&mut self, color: u16) -> Result<(), Self::Error> {
        let (w, h) = (self.width(), self.height());
        self.rect(0, 0, w, h, color)
    }

    fn draw_glyph(
        &mut self,
        x: u16,
        y: u16,
        ch: char,
        color: u16,
        style: GlyphStyle,
    ) -> Result<(), Self::Error> {
        font::draw_glyph(self, x, y, ch, color, style)
    }

    /// Draw a string with the built-in 6x8 font, wrapping per character
    fn draw_text(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        color: u16,
        background: Option<u16>,
    ) -> Result<(), Self::Error> {
        font::draw_text(self, x, y, text, color, background)
    }
}

/// Integer line walk from `(x0, y0)` to `(x1, y1)`, both endpoints included
#[derive(Debug, Clone)]
pub struct Bresenham {
    x: i32,
    y: i32,
    x1: i32,
    y1: i32,
    dx: i32,
    dy: i32,
    step_x: i32,
    step_y: i32,
    err: i32,
    done: bool,
}

impl Bresenham {
    pub fn new(x0: u16, y0: u16, x1: u16, y1: u16) -> Self {
        let (x0, y0, x1, y1) = (x0 as i32, y0 as i32, x1 as i32, y1 as i32);
        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();

        Self {
            x: x0,
            y: y0,
            x1,
            y1,
            dx,
            dy,
            step_x: if x0 < x1 { 1 } else { -1 },
            step_y: if y0 < y1 { 1 } else { -1 },
            err: (if dx > dy { dx } else { -dy }) / 2,
            done: false,
        }
    }
}

impl Iterator for Bresenham {
    type Item = (u16, u16);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        // Every visited cell lies between the two u16 endpoints
        let point = (self.x as u16, self.y as u16);

        if self.x == self.x1 && self.y == self.y1 {
            self.done = true;
        } else {
            let e2 = self.err;
            if e2 > -self.dx {
                self.err -= self.dy;
                self.x += self.step_x;
            }
            if e2 < self.dy {
                self.err += self.dx;
                self.y += self.step_y;
            }
        }

        Some(point)
    }
}

/// Color bars, a frame, a diagonal cross and two text samples
pub fn draw_test_pattern<P: Panel + ?Sized>(panel: &mut P) -> Result<(), P::Error> {
    const BARS: [u16; 8] = [
        color::WHITE,
        color::YELLOW,
        color::CYAN,
        color::GREEN,
        color::MAGENTA,
        color::RED,
        color::BLUE,
        color::BLACK,
    ];

    let (width, height) = (panel.width(), panel.height());
    if width == 0 || height == 0 {
        return Ok(());
    }

    tracing::info!("Drawing test pattern ({}x{})", width, height);

    let bar_width = (width / BARS.len() as u16).max(1);
    for (i, &bar) in BARS.iter().enumerate() {
        panel.rect(i as u16 * bar_width, 0, bar_width, height, bar)?;
    }

    panel.hline(0, 0, width, color::WHITE)?;
    panel.hline(0, height - 1, width, color::WHITE)?;
    panel.vline(0, 0, height, color::WHITE)?;
    panel.vline(width - 1, 0, height, color::WHITE)?;

    panel.line(0, 0, width - 1, height - 1, color::RED)?;
    panel.line(width - 1, 0, 0, height - 1, color::GREEN)?;

    panel.draw_glyph(4, 4, 'A', color::BLACK, GlyphStyle::scaled(2, 2))?;
    panel.draw_text(4, 24, "ST7735", color::WHITE, Some(color::BLACK))?;

    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory panel for exercising the provided methods.

    use super::*;
    use std::convert::Infallible;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Pixel(u16, u16, u16),
        HLine(u16, u16, u16),
        VLine(u16, u16, u16),
        Rect(u16, u16, u16, u16),
    }

    pub struct FrameBuffer {
        pub width: u16,
        pub height: u16,
        pub pixels: Vec<Option<u16>>,
        pub calls: Vec<Call>,
    }

    impl FrameBuffer {
        pub fn new(width: u16, height: u16) -> Self {
            Self {
                width,
                height,
                pixels: vec![None; width as usize * height as usize],
                calls: Vec::new(),
            }
        }

        pub fn get(&self, x: u16, y: u16) -> Option<u16> {
            self.pixels[y as usize * self.width as usize + x as usize]
        }

        fn fill(&mut self, x: u16, y: u16, w: u16, h: u16, color: u16) {
            for py in y..y.saturating_add(h).min(self.height) {
                for px in x..x.saturating_add(w).min(self.width) {
                    self.pixels[py as usize * self.width as usize + px as usize] = Some(color);
                }
            }
        }
    }

    impl Panel for FrameBuffer {
        type Error = Infallible;

        fn width(&self) -> u16 {
            self.width
        }

        fn height(&self) -> u16 {
            self.height
        }

        fn power(&mut self, value: Option<bool>) -> Result<bool, Infallible> {
            Ok(value.unwrap_or(true))
        }

        fn inverted(&mut self, value: Option<bool>) -> Result<bool, Infallible> {
            Ok(value.unwrap_or(false))
        }

        fn backlight(&mut self, value: Option<bool>) -> Result<bool, Infallible> {
            Ok(value.unwrap_or(true))
        }

        fn pixel(&mut self, x: u16, y: u16, color: u16) -> Result<(), Infallible> {
            self.calls.push(Call::Pixel(x, y, color));
            self.fill(x, y, 1, 1, color);
            Ok(())
        }

        fn hline(&mut self, x: u16, y: u16, w: u16, color: u16) -> Result<(), Infallible> {
            self.calls.push(Call::HLine(x, y, w));
            self.fill(x, y, w, 1, color);
            Ok(())
        }

        fn vline(&mut self, x: u16, y: u16, h: u16, color: u16) -> Result<(), Infallible> {
            self.calls.push(Call::VLine(x, y, h));
            self.fill(x, y, 1, h, color);
            Ok(())
        }

        fn rect(&mut self, x: u16, y: u16, w: u16, h: u16, color: u16) -> Result<(), Infallible> {
            self.calls.push(Call::Rect(x, y, w, h));
            self.fill(x, y, w, h, color);
            Ok(())
        }
    }
}
