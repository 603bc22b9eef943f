// Region geometry, show/hide layers and dirty tracking
// Regions are screen coordinates clipped to the panel; layer frames
// are signed rectangles because rotated frames can hang off-screen.

use embedded_graphics::{prelude::*, primitives::Rectangle};

use super::{SCREEN_H, SCREEN_W};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Region {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Region {
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    pub const fn screen() -> Self {
        Self::new(0, 0, SCREEN_W, SCREEN_H)
    }

    // clip a signed rectangle to the screen; None if nothing is left
    pub fn from_rect(rect: Rectangle) -> Option<Self> {
        let screen = Self::screen().to_rect();
        let clipped = rect.intersection(&screen);
        if clipped.size.width == 0 || clipped.size.height == 0 {
            return None;
        }
        Some(Self::new(
            clipped.top_left.x as u16,
            clipped.top_left.y as u16,
            clipped.size.width as u16,
            clipped.size.height as u16,
        ))
    }

    pub fn to_rect(self) -> Rectangle {
        Rectangle::new(
            Point::new(self.x as i32, self.y as i32),
            Size::new(self.w as u32, self.h as u32),
        )
    }

    pub fn union(self, other: Region) -> Self {
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = (self.x + self.w).max(other.x + other.w);
        let y2 = (self.y + self.h).max(other.y + other.h);
        Self {
            x: x1,
            y: y1,
            w: x2 - x1,
            h: y2 - y1,
        }
    }
}

/// A positionable element that can be shown or hidden. Starts hidden.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layer {
    frame: Rectangle,
    hidden: bool,
}

impl Default for Layer {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer {
    pub const fn new() -> Self {
        Self {
            frame: Rectangle::new(Point::zero(), Size::zero()),
            hidden: true,
        }
    }

    pub fn frame(&self) -> Rectangle {
        self.frame
    }

    pub fn set_frame(&mut self, frame: Rectangle) {
        self.frame = frame;
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redraw {
    None,
    Partial(Region),
    Full,
}

// accumulates dirty areas between frames
#[derive(Debug)]
pub struct DirtyTracker {
    redraw: Redraw,
}

impl Default for DirtyTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DirtyTracker {
    pub const fn new() -> Self {
        Self {
            redraw: Redraw::None,
        }
    }

    pub fn request_full_redraw(&mut self) {
        self.redraw = Redraw::Full;
    }

    pub fn mark_dirty(&mut self, region: Region) {
        match self.redraw {
            Redraw::Full => {}
            Redraw::Partial(existing) => {
                self.redraw = Redraw::Partial(existing.union(region));
            }
            Redraw::None => self.redraw = Redraw::Partial(region),
        }
    }

    // off-screen rectangles are dropped
    pub fn mark_rect(&mut self, rect: Rectangle) {
        if let Some(region) = Region::from_rect(rect) {
            self.mark_dirty(region);
        }
    }

    pub fn has_redraw(&self) -> bool {
        !matches!(self.redraw, Redraw::None)
    }

    pub fn take_redraw(&mut self) -> Redraw {
        let r = self.redraw;
        self.redraw = Redraw::None;
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rect_clips_to_screen() {
        let r = Region::from_rect(Rectangle::new(Point::new(-52, -117), Size::new(133, 133)));
        assert_eq!(r, Some(Region::new(0, 0, 81, 16)));

        let off = Region::from_rect(Rectangle::new(Point::new(200, 0), Size::new(10, 10)));
        assert_eq!(off, None);
    }

    #[test]
    fn test_dirty_regions_union() {
        let mut dirty = DirtyTracker::new();
        assert!(!dirty.has_redraw());

        dirty.mark_dirty(Region::new(5, 62, 27, 45));
        dirty.mark_dirty(Region::new(112, 62, 27, 45));
        assert_eq!(dirty.take_redraw(), Redraw::Partial(Region::new(5, 62, 134, 45)));
        assert_eq!(dirty.take_redraw(), Redraw::None);
    }

    #[test]
    fn test_full_redraw_absorbs_partials() {
        let mut dirty = DirtyTracker::new();
        dirty.request_full_redraw();
        dirty.mark_dirty(Region::new(0, 0, 4, 4));
        assert_eq!(dirty.take_redraw(), Redraw::Full);
    }
}
