// Ordered dither for horizontal half-lines
//
// A shade is "draw N pixels every M". Each half-line is anchored at the
// wiper divider and scanned outward, so the stipple stays attached to the
// arm as it moves. Successive lines start (line % M) pixels further out
// so neighbouring rows interleave instead of forming columns.

use embedded_graphics::{
    Pixel,
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    pub draw: u8,
    pub every: u8,
}

impl Pattern {
    const fn new(draw: u8, every: u8) -> Self {
        Self { draw, every }
    }
}

// unknown shades fall back to 50%
pub const fn pattern(shade: u16) -> Pattern {
    match shade {
        10 => Pattern::new(1, 10),
        20 => Pattern::new(1, 5),
        25 => Pattern::new(1, 4),
        30 => Pattern::new(3, 10),
        33 => Pattern::new(1, 3),
        40 => Pattern::new(2, 5),
        50 => Pattern::new(1, 2),
        60 => Pattern::new(3, 5),
        66 => Pattern::new(2, 3),
        70 => Pattern::new(7, 10),
        75 => Pattern::new(3, 4),
        80 => Pattern::new(4, 5),
        90 => Pattern::new(9, 10),
        100 => Pattern::new(1, 1),
        _ => Pattern::new(1, 2),
    }
}

/// Which side of the divider a segment lies on. Left segments are scanned
/// right-to-left, right segments left-to-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Horizontal runs `(x, width)` covering one dithered segment `[start, end]`.
pub struct Runs {
    start: i32,
    end: i32,
    side: Side,
    len: i32,
    draw: i32,
    every: i32,
    dist: i32,
}

impl Runs {
    pub fn new(shade: u16, line: u16, start: i32, end: i32, side: Side) -> Self {
        let len = (end - start + 1).max(0);
        let (draw, every, dist) = if shade >= 100 {
            // one unbroken span
            (len.max(1), len.max(1), 0)
        } else {
            let p = pattern(shade);
            let every = p.every as i32;
            (p.draw as i32, every, line as i32 % every)
        };
        Self {
            start,
            end,
            side,
            len,
            draw,
            every,
            dist,
        }
    }
}

impl Iterator for Runs {
    type Item = (i32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.dist >= self.len {
            return None;
        }
        let near = self.dist;
        let far = (near + self.draw).min(self.len);
        self.dist += self.every;

        let width = (far - near) as u32;
        let x = match self.side {
            Side::Right => self.start + near,
            Side::Left => self.end - far + 1,
        };
        Some((x, width))
    }
}

// draw one dithered segment of screen row `y`; `line` seeds the interleave
#[allow(clippy::too_many_arguments)]
pub fn shade_span<D>(
    target: &mut D,
    y: i32,
    line: u16,
    start: i32,
    end: i32,
    side: Side,
    shade: u16,
    color: BinaryColor,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = PrimitiveStyle::with_stroke(color, 1);
    for (x, width) in Runs::new(shade, line, start, end, side) {
        if width == 1 {
            Pixel(Point::new(x, y), color).draw(target)?;
        } else {
            Line::new(Point::new(x, y), Point::new(x + width as i32 - 1, y))
                .into_styled(style)
                .draw(target)?;
        }
    }
    Ok(())
}
