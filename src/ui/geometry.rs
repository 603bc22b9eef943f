// Rotation-frame adapter for the face's bitmaps
//
// Every bitmap sits centred inside a square frame whose side is the
// bitmap's diagonal, so it can rotate without clipping. Layers store
// that square; drawing needs the unrotated bitmap rectangle inside it.

use embedded_graphics::{prelude::*, primitives::Rectangle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageId {
    Block,
    Am,
    Pm,
    Wiper,
}

impl ImageId {
    pub const fn bitmap_size(self) -> Size {
        match self {
            ImageId::Block => Size::new(9, 9),
            ImageId::Am | ImageId::Pm => Size::new(14, 9),
            ImageId::Wiper => Size::new(133, 13),
        }
    }

    // diagonal of the bitmap, truncated
    pub const fn hypotenuse(self) -> u32 {
        match self {
            ImageId::Block => 12,
            ImageId::Am | ImageId::Pm => 16,
            ImageId::Wiper => 133,
        }
    }

    // top-left of the unrotated bitmap inside its rotation frame
    pub const fn offset(self) -> Point {
        match self {
            ImageId::Block => Point::new(2, 2),
            ImageId::Am | ImageId::Pm => Point::new(1, 3),
            ImageId::Wiper => Point::new(0, 60),
        }
    }
}

pub fn rot_rect_from_bitmap_rect(image: ImageId, bitmap_rect: Rectangle) -> Rectangle {
    let side = image.hypotenuse();
    Rectangle::new(bitmap_rect.top_left - image.offset(), Size::new(side, side))
}

pub fn bitmap_rect_from_rot_rect(image: ImageId, rot_rect: Rectangle) -> Rectangle {
    Rectangle::new(rot_rect.top_left + image.offset(), image.bitmap_size())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_frame_wraps_cell() {
        let cell = Rectangle::new(Point::new(14, 71), Size::new(9, 9));
        let rot = rot_rect_from_bitmap_rect(ImageId::Block, cell);
        assert_eq!(rot, Rectangle::new(Point::new(12, 69), Size::new(12, 12)));
        assert_eq!(bitmap_rect_from_rot_rect(ImageId::Block, rot), cell);
    }

    #[test]
    fn test_am_pm_share_geometry() {
        let icon = Rectangle::new(Point::new(18, 43), Size::new(14, 9));
        let am = rot_rect_from_bitmap_rect(ImageId::Am, icon);
        let pm = rot_rect_from_bitmap_rect(ImageId::Pm, icon);
        assert_eq!(am, pm);
        assert_eq!(am, Rectangle::new(Point::new(17, 40), Size::new(16, 16)));
    }

    #[test]
    fn test_frames_fit_their_bitmaps() {
        for image in [ImageId::Block, ImageId::Am, ImageId::Pm, ImageId::Wiper] {
            let size = image.bitmap_size();
            let off = image.offset();
            assert!(off.x as u32 + size.width <= image.hypotenuse());
            assert!(off.y as u32 + size.height <= image.hypotenuse());
        }
    }
}
