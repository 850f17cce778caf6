//! Common utilities for file upload handlers

use axum::extract::Multipart;
use medcap_core::AppError;

/// The `file` field of an upload form, as sent by the client.
///
/// `filename` is the raw client-supplied name; browsers send an empty string
/// when the user submitted the form without choosing a file.
#[derive(Debug)]
pub struct UploadField {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Extract the file field from a multipart form.
///
/// Returns `None` when no field named "file" is present. Only one field named
/// "file" is accepted; multiple file fields are rejected.
pub async fn extract_multipart_file(
    mut multipart: Multipart,
) -> Result<Option<UploadField>, AppError> {
    let mut upload: Option<UploadField> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == "file" {
            if upload.is_some() {
                return Err(AppError::InvalidInput(
                    "Multiple file fields are not allowed; send exactly one field named 'file'"
                        .to_string(),
                ));
            }
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?
                .to_vec();
            upload = Some(UploadField { filename, data });
        }
        // Other fields are ignored.
    }

    Ok(upload)
}
