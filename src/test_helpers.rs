//! Shared test utilities: synthetic images encoded in memory.
//!
//! Tests that need real pixels (the `image` backend, end-to-end runs) build
//! them here instead of reading fixture files.

use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

/// A `width`×`height` RGBA PNG with a diagonal gradient.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// A `width`×`height` RGB JPEG with a diagonal gradient.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    buf.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_images_have_requested_size() {
        let png = image::load_from_memory(&png_bytes(12, 7)).unwrap();
        assert_eq!((png.width(), png.height()), (12, 7));
        let jpeg = image::load_from_memory(&jpeg_bytes(9, 5)).unwrap();
        assert_eq!((jpeg.width(), jpeg.height()), (9, 5));
    }
}
