use embedded_graphics::{
    Pixel,
    pixelcolor::{Rgb888, RgbColor},
    prelude::{DrawTarget, OriginDimensions, Size},
};

/// Logical size of the top screen.
pub const WIDTH: usize = 400;
pub const HEIGHT: usize = 240;
pub const BYTES_PER_PIXEL: usize = 3;
pub const BUFFER_SIZE: usize = WIDTH * HEIGHT * BYTES_PER_PIXEL;

/// Top-screen framebuffer in the panel's native layout: the LCD is mounted
/// rotated, so memory runs column by column from the bottom row up, three
/// bytes per pixel in blue, green, red order.
pub struct FrameBuffer {
    pixels: [u8; BUFFER_SIZE],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            pixels: [0; BUFFER_SIZE],
        }
    }

    pub fn as_bytes(&self) -> &[u8; BUFFER_SIZE] {
        &self.pixels
    }

    pub fn fill(&mut self, color: Rgb888) {
        for pixel in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            pixel.copy_from_slice(&[color.b(), color.g(), color.r()]);
        }
    }

    fn offset(x: usize, y: usize) -> usize {
        (x * HEIGHT + (HEIGHT - 1 - y)) * BYTES_PER_PIXEL
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb888) {
        if x < 0 || y < 0 || x as usize >= WIDTH || y as usize >= HEIGHT {
            return;
        }
        let offset = Self::offset(x as usize, y as usize);
        self.pixels[offset..offset + BYTES_PER_PIXEL]
            .copy_from_slice(&[color.b(), color.g(), color.r()]);
    }

    /// Color at a logical coordinate. Out-of-range reads are black.
    pub fn pixel(&self, x: usize, y: usize) -> Rgb888 {
        if x >= WIDTH || y >= HEIGHT {
            return Rgb888::BLACK;
        }
        let offset = Self::offset(x, y);
        let bgr = &self.pixels[offset..offset + BYTES_PER_PIXEL];
        Rgb888::new(bgr[2], bgr[1], bgr[0])
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            self.set_pixel(coord.x, coord.y, color);
        }
        Ok(())
    }
}
