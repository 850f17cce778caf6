//! Protocol constants
//!
//! Fixed settings of the captioning pipeline. These are deliberate constants,
//! not configuration: clients depend on the allowed extension set and the
//! response shape, and the caption length cap is part of the model contract.

/// Image extensions accepted by the upload endpoint (lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Video extensions accepted by the upload endpoint (lowercase).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov"];

/// Maximum accepted request body size: 1 GiB.
pub const MAX_UPLOAD_SIZE_BYTES: usize = 1024 * 1024 * 1024;

/// Default number of evenly spaced keyframes sampled from a video.
pub const DEFAULT_KEYFRAME_COUNT: usize = 5;

/// Maximum number of generated caption tokens per image.
pub const CAPTION_MAX_TOKENS: usize = 50;

/// JPEG quality used when writing sampled video frames to disk.
pub const FRAME_JPEG_QUALITY: u8 = 90;

/// Subdirectory of the upload root for stored images and sampled frames.
pub const IMAGES_SUBDIR: &str = "images";

/// Subdirectory of the upload root for stored videos.
pub const VIDEOS_SUBDIR: &str = "videos";

/// Returns true if `extension` (already lowercased) is accepted for upload.
pub fn is_allowed_extension(extension: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&extension) || VIDEO_EXTENSIONS.contains(&extension)
}
