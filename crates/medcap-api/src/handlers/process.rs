use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use medcap_core::models::{FrameCaption, MediaType, ProcessResponse};
use medcap_core::AppError;
use medcap_processing::{
    encode_jpeg, frame_filename, sanitize_filename, UploadValidator, ValidationError, VideoSampler,
};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;

/// Process an uploaded image or video and return captions.
///
/// Images are stored under `images/` and captioned directly. Videos are
/// stored under `videos/`, sampled into evenly spaced keyframes, and each
/// keyframe is stored as a JPEG under `images/` and captioned in order.
///
/// Unreadable video content is not an error: it samples to zero frames and
/// returns an empty result list.
///
/// # Errors
/// - `AppError::InvalidInput` - Missing file, empty filename, or disallowed extension
/// - `AppError::ModelInference` - Caption generation failure
/// - `AppError::Storage` - Filesystem write failure
#[utoipa::path(
    post,
    path = "/process",
    tag = "process",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Media processed and captioned", body = ProcessResponse),
        (status = 400, description = "Invalid upload", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "process_media"))]
pub async fn process_media(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ProcessResponse>, HttpAppError> {
    let Some(field) = extract_multipart_file(multipart).await? else {
        return Err(ValidationError::MissingFile.into());
    };

    let upload = UploadValidator::new().validate(Some(&field.filename))?;
    let safe_name = sanitize_filename(&upload.original_filename);

    tracing::info!(
        filename = %safe_name,
        media_type = ?upload.media_type,
        size_bytes = field.data.len(),
        "Processing upload"
    );

    let stored = state
        .storage
        .store(upload.media_type, &safe_name, field.data)
        .await?;

    match upload.media_type {
        MediaType::Image => {
            let caption = state
                .captioner
                .caption(&stored.path)
                .await
                .map_err(|e| AppError::ModelInference(e.to_string()))?;

            Ok(Json(ProcessResponse::Image {
                path: stored.public_path,
                caption,
            }))
        }
        MediaType::Video => {
            // An unreadable video samples to zero frames and returns an empty
            // result list; only an ffmpeg invocation failure is an error.
            let sampled = VideoSampler::new(
                &stored.path,
                state.config.ffmpeg_path(),
                state.config.ffprobe_path(),
            )
            .sample(state.config.keyframe_count())
            .await?;

            let mut results = Vec::with_capacity(sampled.frames.len());
            for (position, frame) in sampled.frames.iter().enumerate() {
                let jpeg = encode_jpeg(frame)?;
                let stored_frame = state
                    .storage
                    .store(MediaType::Image, &frame_filename(position, &safe_name), jpeg)
                    .await?;

                let caption = state
                    .captioner
                    .caption(&stored_frame.path)
                    .await
                    .map_err(|e| AppError::ModelInference(e.to_string()))?;

                results.push(FrameCaption {
                    frame: stored_frame.public_path,
                    caption,
                });
            }

            tracing::info!(
                frames_requested = sampled.requested,
                frames_decoded = sampled.decoded,
                "Video processed"
            );

            Ok(Json(ProcessResponse::Video {
                results,
                frames_requested: sampled.requested,
                frames_decoded: sampled.decoded,
            }))
        }
    }
}
