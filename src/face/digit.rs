// Block-reveal digit
//
// A digit is a 3x5 grid of 9x9 blocks. Blocks are visited in a fixed
// scattered order, one every 75ms, starting at a random position in
// that order; lit blocks of the glyph appear as they are visited. The
// reveal is done when the cursor wraps back to its start.

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*, primitives::Rectangle};
use log::debug;
use rand::Rng;

use super::{FaceContext, Notify};
use crate::kernel::{Job, TimerError, TimerHandle};
use crate::ui::{ImageId, Layer, bitmap_rect_from_rot_rect, draw_image, rot_rect_from_bitmap_rect};

pub const CELL_COUNT: usize = 15;
pub const CELL_SIZE: u32 = 9;
const GRID_COLS: usize = 3;

pub const SPOT_MS: u32 = 75;

pub const REVEAL_ORDER: [u8; CELL_COUNT] = [2, 6, 10, 0, 13, 5, 4, 12, 11, 7, 14, 1, 8, 9, 3];

#[rustfmt::skip]
const GLYPHS: [[u8; CELL_COUNT]; 10] = [
    [1, 1, 1,
     1, 0, 1,
     1, 0, 1,
     1, 0, 1,
     1, 1, 1],
    [0, 0, 1,
     0, 0, 1,
     0, 0, 1,
     0, 0, 1,
     0, 0, 1],
    [1, 1, 1,
     0, 0, 1,
     1, 1, 1,
     1, 0, 0,
     1, 1, 1],
    [1, 1, 1,
     0, 0, 1,
     1, 1, 1,
     0, 0, 1,
     1, 1, 1],
    [1, 0, 1,
     1, 0, 1,
     1, 1, 1,
     0, 0, 1,
     0, 0, 1],
    [1, 1, 1,
     1, 0, 0,
     1, 1, 1,
     0, 0, 1,
     1, 1, 1],
    [1, 1, 1,
     1, 0, 0,
     1, 1, 1,
     1, 0, 1,
     1, 1, 1],
    [1, 1, 1,
     0, 0, 1,
     0, 0, 1,
     0, 0, 1,
     0, 0, 1],
    [1, 1, 1,
     1, 0, 1,
     1, 1, 1,
     1, 0, 1,
     1, 1, 1],
    [1, 1, 1,
     1, 0, 1,
     1, 1, 1,
     0, 0, 1,
     1, 1, 1],
];

// out-of-range digits have no lit cells
pub fn is_lit(digit: u8, cell: usize) -> bool {
    GLYPHS
        .get(digit as usize)
        .and_then(|g| g.get(cell))
        .is_some_and(|&on| on == 1)
}

// cell rectangle relative to the digit origin
pub fn cell_rect(cell: usize) -> Rectangle {
    let col = (cell % GRID_COLS) as i32;
    let row = (cell / GRID_COLS) as i32;
    let s = CELL_SIZE as i32;
    Rectangle::new(Point::new(col * s, row * s), Size::new(CELL_SIZE, CELL_SIZE))
}

pub struct DigitLayer {
    slot: u8,
    origin: Point,
    cells: [Layer; CELL_COUNT],
    digit: Option<u8>,
    cursor: u8,
    start: u8,
    on_done: Option<Notify>,
    timer: Option<TimerHandle>,
}

impl DigitLayer {
    pub fn new(slot: u8, origin: Point) -> Self {
        Self {
            slot,
            origin,
            cells: [Layer::new(); CELL_COUNT],
            digit: None,
            cursor: 0,
            start: 0,
            on_done: None,
            timer: None,
        }
    }

    pub fn digit(&self) -> Option<u8> {
        self.digit
    }

    pub fn is_revealing(&self) -> bool {
        self.timer.is_some()
    }

    pub fn cell_visible(&self, cell: usize) -> bool {
        self.cells.get(cell).is_some_and(|c| !c.is_hidden())
    }

    pub fn visible_cells(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_hidden()).count()
    }

    /// Start revealing `digit`. Any reveal in progress is dropped without
    /// notifying; `on_done` is handed back once the cycle completes.
    pub fn construct(
        &mut self,
        digit: u8,
        on_done: Option<Notify>,
        ctx: &mut FaceContext,
    ) -> Result<(), TimerError> {
        let _ = self.deconstruct(None, ctx);

        self.digit = Some(digit);
        self.on_done = on_done;
        self.start = ctx.rng.random_range(0..CELL_COUNT as u8);
        self.cursor = self.start;
        debug!("[DIGIT] slot {} -> {} from {}", self.slot, digit, self.start);

        self.schedule(ctx)
    }

    /// Hide every block and stop revealing. Returns `on_done` immediately.
    pub fn deconstruct(&mut self, on_done: Option<Notify>, ctx: &mut FaceContext) -> Option<Notify> {
        if let Some(handle) = self.timer.take() {
            ctx.timers.cancel(handle);
        }
        self.on_done = on_done;

        for cell in self.cells.iter_mut().filter(|c| !c.is_hidden()) {
            cell.set_hidden(true);
            ctx.dirty.mark_rect(cell.frame());
        }

        self.digit = None;
        self.on_done.take()
    }

    // reveal tick
    pub fn on_spot(&mut self, ctx: &mut FaceContext) -> Result<Option<Notify>, TimerError> {
        self.timer = None;
        let Some(digit) = self.digit else {
            return Ok(None);
        };

        let cell = REVEAL_ORDER[self.cursor as usize] as usize;
        if is_lit(digit, cell) {
            let bitmap = cell_rect(cell).translate(self.origin);
            let frame = rot_rect_from_bitmap_rect(ImageId::Block, bitmap);
            self.cells[cell].set_frame(frame);
            self.cells[cell].set_hidden(false);
            ctx.dirty.mark_rect(frame);
        }

        self.cursor = (self.cursor + 1) % CELL_COUNT as u8;
        if self.cursor != self.start {
            self.schedule(ctx)?;
            return Ok(None);
        }

        debug!("[DIGIT] slot {} done", self.slot);
        Ok(self.on_done.take())
    }

    fn schedule(&mut self, ctx: &mut FaceContext) -> Result<(), TimerError> {
        debug_assert!(self.timer.is_none(), "digit tick already pending");
        let handle = ctx.timers.schedule(SPOT_MS, Job::DigitSpot { slot: self.slot })?;
        self.timer = Some(handle);
        Ok(())
    }

    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        for cell in self.cells.iter().filter(|c| !c.is_hidden()) {
            let bitmap = bitmap_rect_from_rot_rect(ImageId::Block, cell.frame());
            draw_image(target, ImageId::Block, bitmap.top_left)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_done(layer: &mut DigitLayer, ctx: &mut FaceContext) -> (usize, Option<Notify>) {
        let mut ticks = 0;
        while let Some(due) = ctx.timers.next_deadline() {
            assert!(matches!(ctx.timers.pop_due(due), Some(Job::DigitSpot { .. })));
            ticks += 1;
            if let Some(n) = layer.on_spot(ctx).unwrap() {
                return (ticks, Some(n));
            }
        }
        (ticks, None)
    }

    #[test]
    fn test_reveal_order_is_a_permutation() {
        let mut seen = [false; CELL_COUNT];
        for &c in REVEAL_ORDER.iter() {
            assert!(!seen[c as usize]);
            seen[c as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_every_glyph_after_full_cycle() {
        for seed in 0..3 {
            let mut ctx = FaceContext::new(seed);
            let mut layer = DigitLayer::new(0, Point::new(5, 62));
            for digit in 0..10u8 {
                layer.construct(digit, Some(Notify::DigitsDone), &mut ctx).unwrap();
                let (ticks, done) = run_to_done(&mut layer, &mut ctx);
                assert_eq!(ticks, CELL_COUNT);
                assert_eq!(done, Some(Notify::DigitsDone));
                for cell in 0..CELL_COUNT {
                    assert_eq!(layer.cell_visible(cell), is_lit(digit, cell), "digit {} cell {}", digit, cell);
                }
            }
        }
    }

    #[test]
    fn test_cell_frames_follow_origin() {
        let mut ctx = FaceContext::new(1);
        let mut layer = DigitLayer::new(3, Point::new(112, 62));
        layer.construct(8, None, &mut ctx).unwrap();
        run_to_done(&mut layer, &mut ctx);

        // bottom-right block of an 8
        let frame = layer.cells[14].frame();
        assert_eq!(frame.top_left, Point::new(112 + 18 - 2, 62 + 36 - 2));
        assert_eq!(frame.size, Size::new(12, 12));
    }

    #[test]
    fn test_deconstruct_hides_and_notifies_at_once() {
        let mut ctx = FaceContext::new(7);
        let mut layer = DigitLayer::new(1, Point::new(37, 62));
        layer.construct(0, None, &mut ctx).unwrap();
        for step in 1..=5 {
            ctx.timers.pop_due(step * SPOT_MS as u64);
            let _ = layer.on_spot(&mut ctx).unwrap();
        }

        let done = layer.deconstruct(Some(Notify::DigitsDone), &mut ctx);
        assert_eq!(done, Some(Notify::DigitsDone));
        assert_eq!(layer.visible_cells(), 0);
        assert_eq!(layer.digit(), None);
        assert!(!layer.is_revealing());
        assert!(ctx.timers.is_empty());
    }

    #[test]
    fn test_reconstruct_drops_previous_completion() {
        let mut ctx = FaceContext::new(3);
        let mut layer = DigitLayer::new(0, Point::zero());
        layer.construct(4, Some(Notify::DigitsDone), &mut ctx).unwrap();
        layer.construct(7, None, &mut ctx).unwrap();

        assert_eq!(ctx.timers.pending(), 1);
        let (_, done) = run_to_done(&mut layer, &mut ctx);
        assert_eq!(done, None);
        assert_eq!(layer.visible_cells(), 7);
    }

    #[test]
    fn test_invalid_digit_lights_nothing() {
        assert!((0..CELL_COUNT).all(|c| !is_lit(10, c)));

        let mut ctx = FaceContext::new(0);
        let mut layer = DigitLayer::new(2, Point::new(80, 62));
        layer.construct(12, None, &mut ctx).unwrap();
        let (ticks, _) = run_to_done(&mut layer, &mut ctx);
        assert_eq!(ticks, CELL_COUNT);
        assert_eq!(layer.visible_cells(), 0);
    }
}
