use medcap_core::constants::is_allowed_extension;
use medcap_core::MediaType;

/// Validation errors for uploaded media files.
///
/// Variants map one-to-one onto the 400 responses of the upload endpoint;
/// the API layer owns the exact client-facing strings.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("No file field in multipart form")]
    MissingFile,

    #[error("File field has an empty filename")]
    EmptyFilename,

    #[error("Disallowed file type: {filename}")]
    DisallowedExtension { filename: String },
}

/// A validated upload: the original filename, its lowercased extension, and
/// the media category derived from it. No side effects have happened yet.
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    pub original_filename: String,
    pub extension: String,
    pub media_type: MediaType,
}

/// Upload file validator
///
/// Checks the multipart file field: presence, non-empty filename, and an
/// extension from the allowed set (case-insensitive, substring after the
/// last `.`). Purely functional; nothing is written on failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct UploadValidator;

impl UploadValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate the (optional) filename of an upload's file field.
    ///
    /// `None` means the form had no `file` field at all.
    pub fn validate(&self, filename: Option<&str>) -> Result<ValidatedUpload, ValidationError> {
        let filename = filename.ok_or(ValidationError::MissingFile)?;

        if filename.is_empty() {
            return Err(ValidationError::EmptyFilename);
        }

        // The extension is the substring after the last dot; no dot means
        // no usable extension.
        let extension = match filename.rsplit_once('.') {
            Some((_, ext)) => ext.to_lowercase(),
            None => {
                return Err(ValidationError::DisallowedExtension {
                    filename: filename.to_string(),
                });
            }
        };

        if !is_allowed_extension(&extension) {
            return Err(ValidationError::DisallowedExtension {
                filename: filename.to_string(),
            });
        }

        Ok(ValidatedUpload {
            original_filename: filename.to_string(),
            media_type: MediaType::from_extension(&extension),
            extension,
        })
    }
}

/// Sanitize filename to prevent path traversal and invalid characters.
///
/// Strips any path components, replaces characters outside
/// `[A-Za-z0-9.-_]` with `_`, collapses runs of dots to a single dot so the
/// result can never contain `..`, and falls back to `"file"` for degenerate
/// names. The extension survives sanitization. The result is safe to join
/// under a storage category directory.
pub fn sanitize_filename(filename: &str) -> String {
    const MAX_FILENAME_LENGTH: usize = 255;

    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let mut sanitized = String::with_capacity(base.len().min(MAX_FILENAME_LENGTH));
    let mut prev_dot = false;
    for c in base.chars().take(MAX_FILENAME_LENGTH) {
        let c = if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
            c
        } else {
            '_'
        };
        if c == '.' {
            if prev_dot {
                continue;
            }
            prev_dot = true;
        } else {
            prev_dot = false;
        }
        sanitized.push(c);
    }

    if sanitized.trim_matches(['.', '_']).is_empty() {
        "file".to_string()
    } else {
        sanitized
    }
}
