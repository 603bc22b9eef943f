// Drawing primitives for the 1-bit face
// Layer/Region bookkeeping, rotation frames, packed images and the
// ordered-dither shading used by the wiper.

pub mod bitmaps;
pub mod dither;
pub mod geometry;
mod widget;

pub use bitmaps::draw_image;
pub use dither::{Pattern, Side, pattern, shade_span};
pub use geometry::{ImageId, bitmap_rect_from_rot_rect, rot_rect_from_bitmap_rect};
pub use widget::{DirtyTracker, Layer, Redraw, Region};

pub const SCREEN_W: u16 = 144;
pub const SCREEN_H: u16 = 168;
