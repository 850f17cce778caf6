//! Binary fixtures for upload tests.

use std::io::Cursor;

/// A small valid PNG, generated in-memory.
pub fn create_minimal_png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([120, 40, 200]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)
        .expect("Failed to encode fixture PNG");
    buf.into_inner()
}

/// A small valid JPEG, generated in-memory.
pub fn create_minimal_jpeg() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([200, 120, 40]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Jpeg)
        .expect("Failed to encode fixture JPEG");
    buf.into_inner()
}
