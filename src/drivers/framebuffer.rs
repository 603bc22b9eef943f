// Full-frame 1-bit buffer for the 144x168 memory LCD.
// 18 bytes per row, MSB = leftmost pixel, set bit = white (On).
// Writes that change a pixel mark its row dirty; flush sends only those.

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::BinaryColor,
    primitives::Rectangle,
};

use crate::ui::{SCREEN_H, SCREEN_W};

pub const WIDTH: u16 = SCREEN_W;
pub const HEIGHT: u16 = SCREEN_H;
pub const BYTES_PER_ROW: usize = WIDTH as usize / 8;
pub const BUF_SIZE: usize = BYTES_PER_ROW * HEIGHT as usize; // 3024B

const DIRTY_WORDS: usize = (HEIGHT as usize).div_ceil(32);

pub struct FrameBuffer {
    buf: [u8; BUF_SIZE],
    dirty: [u32; DIRTY_WORDS],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    // starts black with every row dirty so the first flush paints the panel
    pub const fn new() -> Self {
        Self {
            buf: [0x00; BUF_SIZE],
            dirty: [u32::MAX; DIRTY_WORDS],
        }
    }

    pub fn row(&self, y: u16) -> &[u8] {
        let start = y as usize * BYTES_PER_ROW;
        &self.buf[start..start + BYTES_PER_ROW]
    }

    pub fn pixel(&self, x: u16, y: u16) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }
        let idx = y as usize * BYTES_PER_ROW + x as usize / 8;
        self.buf[idx] & (0x80 >> (x % 8)) != 0
    }

    pub fn is_row_dirty(&self, y: u16) -> bool {
        y < HEIGHT && self.dirty[y as usize / 32] & (1 << (y % 32)) != 0
    }

    pub fn dirty_rows(&self) -> impl Iterator<Item = u16> + '_ {
        (0..HEIGHT).filter(|&y| self.is_row_dirty(y))
    }

    pub fn has_dirty(&self) -> bool {
        self.dirty.iter().any(|&w| w != 0)
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = [0; DIRTY_WORDS];
    }

    // lit pixels on the whole panel
    pub fn count_lit(&self) -> u32 {
        self.buf.iter().map(|b| b.count_ones()).sum()
    }

    #[inline]
    fn mark_row(&mut self, y: u16) {
        self.dirty[y as usize / 32] |= 1 << (y % 32);
    }

    #[inline]
    fn set_pixel(&mut self, x: u16, y: u16, white: bool) {
        let idx = y as usize * BYTES_PER_ROW + x as usize / 8;
        let bit = 0x80 >> (x % 8);
        let old = self.buf[idx];
        let new = if white { old | bit } else { old & !bit };
        if new != old {
            self.buf[idx] = new;
            self.mark_row(y);
        }
    }

    // byte-wise span fill for one row, x1 exclusive
    fn fill_row_span(&mut self, y: u16, x0: u16, x1: u16, white: bool) {
        let row = y as usize * BYTES_PER_ROW;
        let mut changed = false;
        let mut x = x0;
        while x < x1 {
            let byte = x as usize / 8;
            let lo = x % 8;
            let hi = (x1 - (x - lo)).min(8);
            // bits lo..hi of this byte, MSB first
            let mask = (0xFFu16 >> lo) as u8 & !((0xFFu16 >> hi) as u8);
            let old = self.buf[row + byte];
            let new = if white { old | mask } else { old & !mask };
            if new != old {
                self.buf[row + byte] = new;
                changed = true;
            }
            x = x - lo + 8;
        }
        if changed {
            self.mark_row(y);
        }
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x < 0 || coord.x >= WIDTH as i32 || coord.y < 0 || coord.y >= HEIGHT as i32 {
                continue;
            }
            self.set_pixel(coord.x as u16, coord.y as u16, color == BinaryColor::On);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let x0 = area.top_left.x.clamp(0, WIDTH as i32) as u16;
        let y0 = area.top_left.y.clamp(0, HEIGHT as i32) as u16;
        let x1 = area
            .top_left
            .x
            .saturating_add(area.size.width as i32)
            .clamp(0, WIDTH as i32) as u16;
        let y1 = area
            .top_left
            .y
            .saturating_add(area.size.height as i32)
            .clamp(0, HEIGHT as i32) as u16;
        if x0 >= x1 || y0 >= y1 {
            return Ok(());
        }

        let white = color == BinaryColor::On;
        for y in y0..y1 {
            self.fill_row_span(y, x0, x1, white);
        }
        Ok(())
    }
}
