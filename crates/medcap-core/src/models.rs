//! Domain models and API response types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::VIDEO_EXTENSIONS;

/// Media category of an uploaded file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// Classify an already-lowercased extension. Anything that is not a known
    /// video extension is treated as an image; callers validate the extension
    /// against the allowlist before classification.
    pub fn from_extension(extension: &str) -> Self {
        if VIDEO_EXTENSIONS.contains(&extension) {
            MediaType::Video
        } else {
            MediaType::Image
        }
    }

    /// Upload-root subdirectory for this media type.
    pub fn subdir(&self) -> &'static str {
        match self {
            MediaType::Image => crate::constants::IMAGES_SUBDIR,
            MediaType::Video => crate::constants::VIDEOS_SUBDIR,
        }
    }
}

/// One captioned video frame in a video processing response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FrameCaption {
    /// Forward-slash path of the frame JPEG, relative to the upload root's parent.
    pub frame: String,
    pub caption: String,
}

/// The processing result returned by `POST /process`.
///
/// Tagged by `type`: a single captioned image, or an ordered list of captioned
/// frames for a video. `results` ordering matches frame sampling order
/// (ascending original video position). For video, `frames_requested` and
/// `frames_decoded` surface best-effort sampling loss so partial failure is
/// visible to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProcessResponse {
    Image {
        path: String,
        caption: String,
    },
    Video {
        results: Vec<FrameCaption>,
        frames_requested: usize,
        frames_decoded: usize,
    },
}
