//! In-memory video frames and their JPEG serialization.

use anyhow::Context;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use medcap_core::constants::FRAME_JPEG_QUALITY;

/// One decoded video frame: RGB pixels plus its source frame index.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Zero-based frame index in the source video.
    pub index: u64,
    /// Decoded pixels, height x width x 3 in RGB order.
    pub image: RgbImage,
}

/// Encode a frame as JPEG bytes.
pub fn encode_jpeg(frame: &Frame) -> anyhow::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, FRAME_JPEG_QUALITY);
    frame
        .image
        .write_with_encoder(encoder)
        .with_context(|| format!("Failed to encode frame {} as JPEG", frame.index))?;
    Ok(buf)
}

/// Deterministic JPEG filename for the `position`-th sampled frame of an
/// uploaded video, e.g. `frame_0_clip.mp4.jpg`. `position` is the slot in
/// the sampled sequence, not the source frame index, so duplicate sampled
/// indices still get distinct filenames.
pub fn frame_filename(position: usize, source_filename: &str) -> String {
    format!("frame_{}_{}.jpg", position, source_filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_filename_is_deterministic() {
        assert_eq!(frame_filename(0, "clip.mp4"), "frame_0_clip.mp4.jpg");
        assert_eq!(frame_filename(4, "clip.mp4"), "frame_4_clip.mp4.jpg");
        assert_eq!(frame_filename(0, "clip.mp4"), frame_filename(0, "clip.mp4"));
    }

    #[test]
    fn test_jpeg_roundtrip_preserves_rgb_order() {
        // Solid red: if channel order flipped anywhere, red and blue swap.
        let image = RgbImage::from_pixel(32, 32, image::Rgb([220u8, 30, 30]));
        let frame = Frame { index: 7, image };

        let jpeg = encode_jpeg(&frame).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap().to_rgb8();

        let px = decoded.get_pixel(16, 16);
        assert!(px[0] > 150, "red channel lost: {:?}", px);
        assert!(px[1] < 100 && px[2] < 100, "channel order changed: {:?}", px);
    }
}
