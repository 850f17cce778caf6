//! Process endpoint integration tests.
//!
//! Run with: `cargo test -p medcap-api --test process_test`
//! The captioner is stubbed; no model weights or ffmpeg binaries required
//! for the image and validation paths.

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::setup_test_app;
use serde_json::json;

#[tokio::test]
async fn test_missing_file_field_rejected() {
    let app = setup_test_app().await;

    let multipart = MultipartForm::new().add_text("note", "no file here");
    let response = app.client().post("/process").multipart(multipart).await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({"error": "No file uploaded"})
    );
}

#[tokio::test]
async fn test_empty_filename_rejected() {
    let app = setup_test_app().await;

    // Browsers submit filename="" when no file was chosen.
    let part = Part::bytes(Vec::new()).file_name("");
    let multipart = MultipartForm::new().add_part("file", part);
    let response = app.client().post("/process").multipart(multipart).await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({"error": "No selected file"})
    );
}

#[tokio::test]
async fn test_disallowed_extension_rejected_without_side_effects() {
    let app = setup_test_app().await;

    let part = Part::bytes(b"%PDF-1.4".to_vec()).file_name("document.pdf");
    let multipart = MultipartForm::new().add_part("file", part);
    let response = app.client().post("/process").multipart(multipart).await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({"error": "Invalid file type"})
    );

    // Nothing may hit disk on a rejected upload.
    for subdir in ["images", "videos"] {
        let dir = app.upload_root.join(subdir);
        let entries: Vec<_> = std::fs::read_dir(&dir).unwrap().collect();
        assert!(entries.is_empty(), "rejected upload left files in {}", subdir);
    }
}

#[tokio::test]
async fn test_extension_check_is_case_insensitive() {
    let app = setup_test_app().await;

    let part = Part::bytes(helpers::fixtures::create_minimal_jpeg()).file_name("photo.JPG");
    let multipart = MultipartForm::new().add_part("file", part);
    let response = app.client().post("/process").multipart(multipart).await;

    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_image_upload_is_stored_and_captioned() {
    let app = setup_test_app().await;

    let part = Part::bytes(helpers::fixtures::create_minimal_jpeg()).file_name("cat.jpg");
    let multipart = MultipartForm::new().add_part("file", part);
    let response = app.client().post("/process").multipart(multipart).await;

    assert_eq!(response.status_code(), 200);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["type"], "image");

    let path = body["path"].as_str().unwrap();
    assert!(path.ends_with("images/cat.jpg"), "unexpected path: {}", path);
    assert!(!path.contains('\\'), "path must use forward slashes: {}", path);

    let caption = body["caption"].as_str().unwrap();
    assert_eq!(caption, "a test caption for cat.jpg");

    assert!(app.upload_root.join("images").join("cat.jpg").is_file());
}

#[tokio::test]
async fn test_filename_is_sanitized_before_storage() {
    let app = setup_test_app().await;

    let part = Part::bytes(helpers::fixtures::create_minimal_png()).file_name("../my cat!.png");
    let multipart = MultipartForm::new().add_part("file", part);
    let response = app.client().post("/process").multipart(multipart).await;

    assert_eq!(response.status_code(), 200);
    let body = response.json::<serde_json::Value>();
    let path = body["path"].as_str().unwrap();
    assert!(path.ends_with("images/my_cat_.png"), "unexpected path: {}", path);

    // The traversal component must not have escaped the upload root.
    assert!(app.upload_root.join("images").join("my_cat_.png").is_file());
}

#[tokio::test]
async fn test_reupload_replaces_existing_file() {
    let app = setup_test_app().await;

    for _ in 0..2 {
        let part = Part::bytes(helpers::fixtures::create_minimal_png()).file_name("same.png");
        let multipart = MultipartForm::new().add_part("file", part);
        let response = app.client().post("/process").multipart(multipart).await;
        assert_eq!(response.status_code(), 200);
    }
}

fn ffprobe_available() -> bool {
    std::process::Command::new("ffprobe")
        .arg("-version")
        .output()
        .is_ok()
}

#[tokio::test]
async fn test_unreadable_video_yields_empty_results() {
    if !ffprobe_available() {
        eprintln!("ffprobe not installed, skipping");
        return;
    }
    let app = setup_test_app().await;

    // Valid extension, garbage content: the sampler finds no readable
    // frames, so the response is an empty video result, not an error.
    let part = Part::bytes(b"not actually an mp4".to_vec()).file_name("clip.mp4");
    let multipart = MultipartForm::new().add_part("file", part);
    let response = app.client().post("/process").multipart(multipart).await;

    assert_eq!(response.status_code(), 200);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["type"], "video");
    assert_eq!(body["results"], serde_json::json!([]));
    assert_eq!(body["frames_requested"], 0);
    assert_eq!(body["frames_decoded"], 0);

    // The upload itself is still stored.
    assert!(app.upload_root.join("videos").join("clip.mp4").is_file());
}

#[tokio::test]
async fn test_home_page_served() {
    let app = setup_test_app().await;

    let response = app.client().get("/").await;
    assert_eq!(response.status_code(), 200);
    assert!(response.text().contains("Media Captioning"));
}

#[tokio::test]
async fn test_openapi_spec_served() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let spec = response.json::<serde_json::Value>();
    assert!(spec["paths"]["/process"]["post"].is_object());
}

#[tokio::test]
async fn test_stored_image_is_publicly_served() {
    let app = setup_test_app().await;

    let part = Part::bytes(helpers::fixtures::create_minimal_png()).file_name("served.png");
    let multipart = MultipartForm::new().add_part("file", part);
    let response = app.client().post("/process").multipart(multipart).await;
    assert_eq!(response.status_code(), 200);

    let path = response.json::<serde_json::Value>()["path"]
        .as_str()
        .unwrap()
        .to_string();
    let fetched = app.client().get(&format!("/{}", path.trim_start_matches('/'))).await;
    assert_eq!(fetched.status_code(), 200);
}
