//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use medcap_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Medcap API",
        version = "0.1.0",
        description = "Media captioning API. Upload an image or video to POST /process and receive BLIP-generated captions: one per image, or one per sampled keyframe for videos."
    ),
    paths(
        handlers::home::home,
        handlers::process::process_media,
    ),
    components(schemas(
        models::ProcessResponse,
        models::FrameCaption,
        error::ErrorResponse,
    )),
    tags(
        (name = "process", description = "Media upload and captioning"),
        (name = "ui", description = "Browser upload page")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
