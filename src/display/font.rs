//! Built-in 6x8 bitmap font and glyph rendering.
//!
//! Each glyph is six column bytes, left to right. Bit `i` of a column is row
//! `i`, counted from the top. Printable ASCII (32..=126) is covered; any other
//! character draws nothing.

use super::graphics::Panel;

/// Glyph width in pixels
pub const GLYPH_WIDTH: u16 = 6;
/// Glyph height in pixels
pub const GLYPH_HEIGHT: u16 = 8;
/// Horizontal distance between characters in a string
pub const ADVANCE: u16 = GLYPH_WIDTH + 1;
/// Vertical distance between wrapped lines
pub const LINE_HEIGHT: u16 = GLYPH_HEIGHT + 1;

const FIRST: u32 = 32;
const LAST: u32 = 126;

/// One character's column bitmaps
pub type Glyph = [u8; GLYPH_WIDTH as usize];

#[rustfmt::skip]
static GLYPHS: [Glyph; (LAST - FIRST + 1) as usize] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // space
    [0x00, 0x00, 0x06, 0x5F, 0x06, 0x00], // !
    [0x00, 0x07, 0x03, 0x00, 0x07, 0x03], // "
    [0x00, 0x24, 0x7E, 0x24, 0x7E, 0x24], // #
    [0x00, 0x24, 0x2B, 0x6A, 0x12, 0x00], // $
    [0x00, 0x63, 0x13, 0x08, 0x64, 0x63], // %
    [0x00, 0x36, 0x49, 0x56, 0x20, 0x50], // &
    [0x00, 0x00, 0x07, 0x03, 0x00, 0x00], // '
    [0x00, 0x00, 0x3E, 0x41, 0x00, 0x00], // (
    [0x00, 0x00, 0x41, 0x3E, 0x00, 0x00], // )
    [0x00, 0x08, 0x3E, 0x1C, 0x3E, 0x08], // *
    [0x00, 0x08, 0x08, 0x3E, 0x08, 0x08], // +
    [0x00, 0x00, 0xE0, 0x60, 0x00, 0x00], // ,
    [0x00, 0x08, 0x08, 0x08, 0x08, 0x08], // -
    [0x00, 0x00, 0x60, 0x60, 0x00, 0x00], // .
    [0x00, 0x20, 0x10, 0x08, 0x04, 0x02], // /
    [0x00, 0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
    [0x00, 0x00, 0x42, 0x7F, 0x40, 0x00], // 1
    [0x00, 0x62, 0x51, 0x49, 0x49, 0x46], // 2
    [0x00, 0x22, 0x49, 0x49, 0x49, 0x36], // 3
    [0x00, 0x18, 0x14, 0x12, 0x7F, 0x10], // 4
    [0x00, 0x2F, 0x49, 0x49, 0x49, 0x31], // 5
    [0x00, 0x3C, 0x4A, 0x49, 0x49, 0x30], // 6
    [0x00, 0x01, 0x71, 0x09, 0x05, 0x03], // 7
    [0x00, 0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x00, 0x06, 0x49, 0x49, 0x29, 0x1E], // 9
    [0x00, 0x00, 0x6C, 0x6C, 0x00, 0x00], // :
    [0x00, 0x00, 0xEC, 0x6C, 0x00, 0x00], // ;
    [0x00, 0x08, 0x14, 0x22, 0x41, 0x00], // <
    [0x00, 0x24, 0x24, 0x24, 0x24, 0x24], // =
    [0x00, 0x00, 0x41, 0x22, 0x14, 0x08], // >
    [0x00, 0x02, 0x01, 0x59, 0x09, 0x06], // ?
    [0x00, 0x3E, 0x41, 0x5D, 0x55, 0x1E], // @
    [0x00, 0x7E, 0x11, 0x11, 0x11, 0x7E], // A
    [0x00, 0x7F, 0x49, 0x49, 0x49, 0x36], // B
    [0x00, 0x3E, 0x41, 0x41, 0x41, 0x22], // C
    [0x00, 0x7F, 0x41, 0x41, 0x41, 0x3E], // D
    [0x00, 0x7F, 0x49, 0x49, 0x49, 0x41], // E
    [0x00, 0x7F, 0x09, 0x09, 0x09, 0x01], // F
    [0x00, 0x3E, 0x41, 0x49, 0x49, 0x7A], // G
    [0x00, 0x7F, 0x08, 0x08, 0x08, 0x7F], // H
    [0x00, 0x00, 0x41, 0x7F, 0x41, 0x00], // I
    [0x00, 0x30, 0x40, 0x40, 0x40, 0x3F], // J
    [0x00, 0x7F, 0x08, 0x14, 0x22, 0x41], // K
    [0x00, 0x7F, 0x40, 0x40, 0x40, 0x40], // L
    [0x00, 0x7F, 0x02, 0x04, 0x02, 0x7F], // M
    [0x00, 0x7F, 0x02, 0x04, 0x08, 0x7F], // N
    [0x00, 0x3E, 0x41, 0x41, 0x41, 0x3E], // O
    [0x00, 0x7F, 0x09, 0x09, 0x09, 0x06], // P
    [0x00, 0x3E, 0x41, 0x51, 0x21, 0x5E], // Q
    [0x00, 0x7F, 0x09, 0x09, 0x19, 0x66], // R
    [0x00, 0x26, 0x49, 0x49, 0x49, 0x32], // S
    [0x00, 0x01, 0x01, 0x7F, 0x01, 0x01], // T
    [0x00, 0x3F, 0x40, 0x40, 0x40, 0x3F], // U
    [0x00, 0x1F, 0x20, 0x40, 0x20, 0x1F], // V
    [0x00, 0x3F, 0x40, 0x3C, 0x40, 0x3F], // W
    [0x00, 0x63, 0x14, 0x08, 0x14, 0x63], // X
    [0x00, 0x07, 0x08, 0x70, 0x08, 0x07], // Y
    [0x00, 0x71, 0x49, 0x45, 0x43, 0x00], // Z
    [0x00, 0x00, 0x7F, 0x41, 0x41, 0x00], // [
    [0x00, 0x02, 0x04, 0x08, 0x10, 0x20], // \
    [0x00, 0x00, 0x41, 0x41, 0x7F, 0x00], // ]
    [0x00, 0x04, 0x02, 0x01, 0x02, 0x04], // ^
    [0x80, 0x80, 0x80, 0x80, 0x80, 0x80], // _
    [0x00, 0x00, 0x03, 0x07, 0x00, 0x00], // `
    [0x00, 0x20, 0x54, 0x54, 0x54, 0x78], // a
    [0x00, 0x7F, 0x44, 0x44, 0x44, 0x38], // b
    [0x00, 0x38, 0x44, 0x44, 0x44, 0x28], // c
    [0x00, 0x38, 0x44, 0x44, 0x44, 0x7F], // d
    [0x00, 0x38, 0x54, 0x54, 0x54, 0x08], // e
    [0x00, 0x08, 0x7E, 0x09, 0x09, 0x00], // f
    [0x00, 0x18, 0xA4, 0xA4, 0xA4, 0x7C], // g
    [0x00, 0x7F, 0x04, 0x04, 0x78, 0x00], // h
    [0x00, 0x00, 0x00, 0x7D, 0x40, 0x00], // i
    [0x00, 0x40, 0x80, 0x84, 0x7D, 0x00], // j
    [0x00, 0x7F, 0x10, 0x28, 0x44, 0x00], // k
    [0x00, 0x00, 0x00, 0x7F, 0x40, 0x00], // l
    [0x00, 0x7C, 0x04, 0x18, 0x04, 0x78], // m
    [0x00, 0x7C, 0x04, 0x04, 0x78, 0x00], // n
    [0x00, 0x38, 0x44, 0x44, 0x44, 0x38], // o
    [0x00, 0xFC, 0x44, 0x44, 0x44, 0x38], // p
    [0x00, 0x38, 0x44, 0x44, 0x44, 0xFC], // q
    [0x00, 0x44, 0x78, 0x44, 0x04, 0x08], // r
    [0x00, 0x08, 0x54, 0x54, 0x54, 0x20], // s
    [0x00, 0x04, 0x3E, 0x44, 0x24, 0x00], // t
    [0x00, 0x3C, 0x40, 0x20, 0x7C, 0x00], // u
    [0x00, 0x1C, 0x20, 0x40, 0x20, 0x1C], // v
    [0x00, 0x3C, 0x60, 0x30, 0x60, 0x3C], // w
    [0x00, 0x6C, 0x10, 0x10, 0x6C, 0x00], // x
    [0x00, 0x9C, 0xA0, 0x60, 0x3C, 0x00], // y
    [0x00, 0x64, 0x54, 0x54, 0x4C, 0x00], // z
    [0x00, 0x08, 0x3E, 0x41, 0x41, 0x00], // {
    [0x00, 0x00, 0x00, 0x77, 0x00, 0x00], // |
    [0x00, 0x00, 0x41, 0x41, 0x3E, 0x08], // }
    [0x00, 0x02, 0x01, 0x02, 0x01, 0x00], // ~
];

/// Look up the glyph for `ch`
pub fn glyph(ch: char) -> Option<&'static Glyph> {
    let code = ch as u32;
    if (FIRST..=LAST).contains(&code) {
        Some(&GLYPHS[(code - FIRST) as usize])
    } else {
        None
    }
}

/// How a glyph is blitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphStyle {
    /// Horizontal size of one font pixel. 0 together with `scale_y == 0` means 1.
    pub scale_x: u8,
    /// Vertical size of one font pixel. 0 together with `scale_x == 0` means 1.
    pub scale_y: u8,
    /// Color for clear bits; `None` leaves them untouched. Unscaled glyphs only.
    pub background: Option<u16>,
}

impl GlyphStyle {
    pub fn scaled(scale_x: u8, scale_y: u8) -> Self {
        Self {
            scale_x,
            scale_y,
            background: None,
        }
    }

    pub fn with_background(mut self, color: u16) -> Self {
        self.background = Some(color);
        self
    }

    fn scale(&self) -> (u8, u8) {
        if self.scale_x == 0 && self.scale_y == 0 {
            (1, 1)
        } else {
            (self.scale_x, self.scale_y)
        }
    }
}

impl Default for GlyphStyle {
    fn default() -> Self {
        Self::scaled(1, 1)
    }
}

/// Draw one character with its top-left corner at `(x, y)`
pub fn draw_glyph<P: Panel + ?Sized>(
    panel: &mut P,
    x: u16,
    y: u16,
    ch: char,
    color: u16,
    style: GlyphStyle,
) -> Result<(), P::Error> {
    let Some(columns) = glyph(ch) else {
        return Ok(());
    };

    let (scale_x, scale_y) = style.scale();

    if scale_x <= 1 && scale_y <= 1 {
        for (col, &bits) in columns.iter().enumerate() {
            let px = x.saturating_add(col as u16);
            for row in 0..GLYPH_HEIGHT {
                let py = y.saturating_add(row);
                if bits & (1 << row) != 0 {
                    panel.pixel(px, py, color)?;
                } else if let Some(background) = style.background {
                    panel.pixel(px, py, background)?;
                }
            }
        }
    } else {
        let (sx, sy) = (scale_x as u16, scale_y as u16);
        // The shift is the row index within the column, never the column
        // counter, so each column is scanned exactly GLYPH_HEIGHT times.
        for (col, &bits) in columns.iter().enumerate() {
            let px = x.saturating_add(col as u16 * sx);
            for row in 0..GLYPH_HEIGHT {
                if bits & (1 << row) != 0 {
                    let py = y.saturating_add(row * sy);
                    panel.rect(px, py, sx, sy, color)?;
                }
            }
        }
    }

    Ok(())
}

/// Draw a string, wrapping to a new line when the next character would not fit
///
/// Wrapping is per character: the cursor returns to `x` and moves down by
/// [`LINE_HEIGHT`].
pub fn draw_text<P: Panel + ?Sized>(
    panel: &mut P,
    x: u16,
    y: u16,
    text: &str,
    color: u16,
    background: Option<u16>,
) -> Result<(), P::Error> {
    let style = match background {
        Some(color) => GlyphStyle::default().with_background(color),
        None => GlyphStyle::default(),
    };

    let mut px = x;
    let mut py = y;
    for ch in text.chars() {
        draw_glyph(panel, px, py, ch, color, style)?;
        px = px.saturating_add(ADVANCE);
        if px as u32 + ADVANCE as u32 > panel.width() as u32 {
            py = py.saturating_add(LINE_HEIGHT);
            px = x;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::graphics::testing::{Call, FrameBuffer};

    fn set_bits(fb: &FrameBuffer) -> Vec<(u16, u16)> {
        let mut set = Vec::new();
        for y in 0..fb.height {
            for x in 0..fb.width {
                if fb.get(x, y).is_some() {
                    set.push((x, y));
                }
            }
        }
        set
    }

    #[test]
    fn table_covers_printable_ascii() {
        assert_eq!(GLYPHS.len(), 95);
        assert_eq!(glyph(' '), Some(&[0; 6]));
        assert_eq!(glyph('A'), Some(&[0x00, 0x7E, 0x11, 0x11, 0x11, 0x7E]));
        assert_eq!(glyph('~'), Some(&[0x00, 0x02, 0x01, 0x02, 0x01, 0x00]));
    }

    #[test]
    fn characters_outside_table_have_no_glyph() {
        assert_eq!(glyph('\n'), None);
        assert_eq!(glyph('\u{7F}'), None);
        assert_eq!(glyph('é'), None);

        let mut fb = FrameBuffer::new(16, 16);
        draw_glyph(&mut fb, 0, 0, '\u{1F}', 1, GlyphStyle::default()).unwrap();
        assert!(fb.calls.is_empty());
    }

    #[test]
    fn unscaled_glyph_plots_set_bits_only() {
        let mut fb = FrameBuffer::new(16, 16);
        draw_glyph(&mut fb, 2, 3, '!', 0xF800, GlyphStyle::default()).unwrap();

        // '!' = 00 00 06 5F 06 00
        let expected_pixels = 2 + 6 + 2;
        assert_eq!(fb.calls.len(), expected_pixels);
        assert_eq!(fb.get(4, 4), Some(0xF800)); // column 2, bit 1
        assert_eq!(fb.get(5, 3), Some(0xF800)); // column 3, bit 0
        assert_eq!(fb.get(5, 8), None); // column 3, bit 5 clear
        assert_eq!(fb.get(5, 9), Some(0xF800)); // column 3, bit 6
    }

    #[test]
    fn background_fill_covers_whole_cell() {
        let mut fb = FrameBuffer::new(16, 16);
        let style = GlyphStyle::default().with_background(0x001F);
        draw_glyph(&mut fb, 0, 0, '!', 0xF800, style).unwrap();

        assert_eq!(fb.calls.len(), 48);
        assert_eq!(fb.get(0, 0), Some(0x001F));
        assert_eq!(fb.get(3, 0), Some(0xF800));
        assert_eq!(set_bits(&fb).len(), 48);
    }

    #[test]
    fn zero_scale_defaults_to_one() {
        let mut unscaled = FrameBuffer::new(16, 16);
        draw_glyph(&mut unscaled, 0, 0, 'A', 1, GlyphStyle::scaled(0, 0)).unwrap();
        let mut reference = FrameBuffer::new(16, 16);
        draw_glyph(&mut reference, 0, 0, 'A', 1, GlyphStyle::default()).unwrap();
        assert_eq!(unscaled.calls, reference.calls);
    }

    #[test]
    fn scaled_glyph_expands_each_set_bit() {
        let mut fb = FrameBuffer::new(32, 32);
        draw_glyph(&mut fb, 1, 1, 'A', 7, GlyphStyle::scaled(2, 3)).unwrap();

        // 'A' column 1 = 0x7E: rows 1..=6
        assert!(fb.calls.contains(&Call::Rect(3, 4, 2, 3)));
        assert!(fb.calls.contains(&Call::Rect(3, 19, 2, 3)));
        assert!(!fb.calls.contains(&Call::Rect(3, 1, 2, 3)));

        let set_count: u32 = glyph('A').unwrap().iter().map(|b| b.count_ones()).sum();
        assert_eq!(fb.calls.len() as u32, set_count);
        assert_eq!(set_bits(&fb).len() as u32, set_count * 6);
    }

    #[test]
    fn scaled_glyph_ignores_background() {
        let mut fb = FrameBuffer::new(32, 32);
        let style = GlyphStyle::scaled(2, 2).with_background(0xFFFF);
        draw_glyph(&mut fb, 0, 0, '-', 1, style).unwrap();
        assert!(fb.calls.iter().all(|c| matches!(c, Call::Rect(_, _, 2, 2))));
        assert!(fb.pixels.iter().flatten().all(|&c| c == 1));
    }

    #[test]
    fn text_advances_by_glyph_width_plus_one() {
        let mut fb = FrameBuffer::new(160, 128);
        draw_text(&mut fb, 0, 0, "||", 1, None).unwrap();
        // '|' = 00 00 00 77 00 00, column 3
        assert_eq!(fb.get(3, 0), Some(1));
        assert_eq!(fb.get(10, 0), Some(1));
    }

    #[test]
    fn text_wraps_at_right_edge() {
        let mut fb = FrameBuffer::new(160, 128);
        draw_text(&mut fb, 158, 10, "||", 1, Some(0)).unwrap();

        let origins: Vec<(u16, u16)> = fb
            .calls
            .chunks(48)
            .map(|cell| match cell[0] {
                Call::Pixel(x, y, _) => (x, y),
                ref other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(origins, vec![(158, 10), (158, 10 + LINE_HEIGHT)]);
    }

    #[test]
    fn text_wraps_back_to_start_column() {
        let mut fb = FrameBuffer::new(30, 40);
        draw_text(&mut fb, 2, 0, "ABCD", 1, Some(0)).unwrap();

        let origins: Vec<(u16, u16)> = fb
            .calls
            .chunks(48)
            .map(|cell| match cell[0] {
                Call::Pixel(x, y, _) => (x, y),
                ref other => panic!("unexpected {:?}", other),
            })
            .collect();
        // 2 + 7 + 7 = 16, 16 + 7 = 23 fits, 23 + 7 = 30 does not exceed 30
        assert_eq!(origins, vec![(2, 0), (9, 0), (16, 0), (23, 0)]);
    }

    #[test]
    fn unrenderable_characters_still_advance() {
        let mut fb = FrameBuffer::new(160, 128);
        draw_text(&mut fb, 0, 0, "\t|", 1, None).unwrap();
        assert_eq!(fb.get(3, 0), None);
        assert_eq!(fb.get(10, 0), Some(1));
    }
}
