use embedded_graphics::{
    Drawable,
    mono_font::{MonoTextStyle, ascii::FONT_8X13},
    pixelcolor::Rgb888,
    prelude::Point,
    text::{Baseline, Text},
};

use crate::framebuffer::FrameBuffer;

/// Glyph cell of the console font.
pub const SPACING_X: i32 = 8;
pub const SPACING_Y: i32 = 13;

pub const COLOR_TITLE: Rgb888 = Rgb888::new(0xFF, 0x99, 0x00);
pub const COLOR_WHITE: Rgb888 = Rgb888::new(0xFF, 0xFF, 0xFF);
pub const COLOR_RED: Rgb888 = Rgb888::new(0xFF, 0x00, 0x00);
pub const COLOR_BLACK: Rgb888 = Rgb888::new(0x00, 0x00, 0x00);

/// Text drawing surface used by the menu and the error screen.
pub trait Screen {
    /// Power up the panels and clear them to black.
    fn init_screens(&mut self);
    /// Draw `text` with its top-left corner at `(x, y)`. Each `'\n'` starts a
    /// new line `SPACING_Y` further down. Returns the y of the last line.
    fn draw_string(&mut self, text: &str, x: i32, y: i32, color: Rgb888) -> i32;
    fn draw_character(&mut self, character: char, x: i32, y: i32, color: Rgb888);
    /// Make everything drawn so far visible.
    fn present(&mut self);
}

/// Panel driver that scans out a finished frame.
pub trait Display {
    fn init(&mut self);
    fn show(&mut self, frame: &FrameBuffer);
}

/// [`Screen`] that rasterizes text into a [`FrameBuffer`] and hands it to a
/// [`Display`] on present. Glyphs are drawn foreground-only, so redrawing a
/// glyph in black erases it.
pub struct Console<'a, D: Display> {
    frame: &'a mut FrameBuffer,
    display: D,
}

impl<'a, D: Display> Console<'a, D> {
    pub fn new(frame: &'a mut FrameBuffer, display: D) -> Self {
        Console { frame, display }
    }

    pub fn frame(&self) -> &FrameBuffer {
        &*self.frame
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }
}

impl<D: Display> Screen for Console<'_, D> {
    fn init_screens(&mut self) {
        self.display.init();
        self.frame.fill(COLOR_BLACK);
        self.display.show(self.frame);
    }

    fn draw_string(&mut self, text: &str, x: i32, y: i32, color: Rgb888) -> i32 {
        let style = MonoTextStyle::new(&FONT_8X13, color);
        let mut line_y = y;
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                line_y += SPACING_Y;
            }
            Text::with_baseline(line, Point::new(x, line_y), style, Baseline::Top)
                .draw(self.frame)
                .ok();
        }
        line_y
    }

    fn draw_character(&mut self, character: char, x: i32, y: i32, color: Rgb888) {
        let mut buf = [0u8; 4];
        let glyph = character.encode_utf8(&mut buf);
        let style = MonoTextStyle::new(&FONT_8X13, color);
        Text::with_baseline(glyph, Point::new(x, y), style, Baseline::Top)
            .draw(self.frame)
            .ok();
    }

    fn present(&mut self) {
        self.display.show(self.frame);
    }
}
