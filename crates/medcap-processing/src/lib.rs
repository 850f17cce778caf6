//! Medcap Processing Library
//!
//! Upload validation, filename sanitization, and video keyframe sampling.
//! Video decoding shells out to ffmpeg/ffprobe; everything else is pure.

pub mod frames;
pub mod validator;
pub mod video;

// Re-export commonly used types
pub use frames::{encode_jpeg, frame_filename, Frame};
pub use validator::{sanitize_filename, UploadValidator, ValidatedUpload, ValidationError};
pub use video::{sample_indices, SampledFrames, VideoProbe, VideoSampler};
