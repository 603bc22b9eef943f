// 1-bit face images
//
// Packed MSB-first, row-major, ceil(width/8) bytes per row. A set bit
// is a lit (white) pixel. The wiper arm has no image; it is stroked.

use embedded_graphics::{
    image::{Image, ImageRaw},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::Rectangle,
};

use super::geometry::ImageId;

#[rustfmt::skip]
static BLOCK_9X9: [u8; 18] = [
    0b11111111, 0b10000000,
    0b11111111, 0b10000000,
    0b11111111, 0b10000000,
    0b11111111, 0b10000000,
    0b11111111, 0b10000000,
    0b11111111, 0b10000000,
    0b11111111, 0b10000000,
    0b11111111, 0b10000000,
    0b11111111, 0b10000000,
];

#[rustfmt::skip]
static AM_14X9: [u8; 18] = [
    0b01111000, 0b10000100,
    0b11001100, 0b11001100,
    0b11001100, 0b11111100,
    0b11001100, 0b10110100,
    0b11111100, 0b10000100,
    0b11001100, 0b10000100,
    0b11001100, 0b10000100,
    0b11001100, 0b10000100,
    0b11001100, 0b10000100,
];

#[rustfmt::skip]
static PM_14X9: [u8; 18] = [
    0b11111000, 0b10000100,
    0b11001100, 0b11001100,
    0b11001100, 0b11111100,
    0b11001100, 0b10110100,
    0b11111000, 0b10000100,
    0b11000000, 0b10000100,
    0b11000000, 0b10000100,
    0b11000000, 0b10000100,
    0b11000000, 0b10000100,
];

pub fn image_raw(image: ImageId) -> Option<ImageRaw<'static, BinaryColor>> {
    let data: &'static [u8] = match image {
        ImageId::Block => &BLOCK_9X9,
        ImageId::Am => &AM_14X9,
        ImageId::Pm => &PM_14X9,
        ImageId::Wiper => return None,
    };
    Some(ImageRaw::new(data, image.bitmap_size().width))
}

// draws only the lit pixels so the image composes over what is below
pub fn draw_image<D>(target: &mut D, image: ImageId, top_left: Point) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let Some(raw) = image_raw(image) else {
        return Ok(());
    };
    Image::new(&raw, top_left).draw(&mut Transparent(target))
}

// DrawTarget adapter that drops Off pixels
struct Transparent<'a, D>(&'a mut D);

impl<D> Dimensions for Transparent<'_, D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    fn bounding_box(&self) -> Rectangle {
        self.0.bounding_box()
    }
}

impl<D> DrawTarget for Transparent<'_, D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    type Color = BinaryColor;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.0
            .draw_iter(pixels.into_iter().filter(|p| p.1 == BinaryColor::On))
    }
}
