//! Multipart upload extraction shared by the document handlers.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::Bytes;
use docscrub_core::AppError;
use http_body_util::LengthLimitError;
use std::error::Error as StdError;

use crate::constants::{FILE_FIELD, LOCATIONS_FIELD};

/// `LengthLimitError`'s message, for wrappers that only keep the text.
const LENGTH_LIMIT_MESSAGE: &str = "length limit exceeded";

/// The uploaded document.
#[derive(Debug)]
pub struct UploadedFile {
    pub data: Bytes,
    pub filename: String,
    pub content_type: String,
}

/// Everything the document endpoints read from a multipart form.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub locations: Option<String>,
}

impl UploadForm {
    pub fn require_file(self) -> Result<(UploadedFile, Option<String>), AppError> {
        match self.file {
            Some(file) => Ok((file, self.locations)),
            None => Err(AppError::InvalidInput("No file uploaded".to_string())),
        }
    }
}

/// Whether a body length limit cut the stream short. Body limits surface
/// as a read failure several wrappers deep when the request carries no
/// `Content-Length`, so the whole source chain is searched.
fn exceeds_length_limit(err: &MultipartError) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if source.is::<LengthLimitError>() || source.to_string().contains(LENGTH_LIMIT_MESSAGE) {
            return true;
        }
        current = source.source();
    }
    false
}

fn too_large(detail: impl std::fmt::Display) -> AppError {
    AppError::PayloadTooLarge(format!("Upload exceeds the size limit: {}", detail))
}

fn multipart_error(err: MultipartError, what: &str) -> AppError {
    if exceeds_length_limit(&err) {
        return too_large(err.body_text());
    }
    match err.status() {
        StatusCode::PAYLOAD_TOO_LARGE => too_large(err.body_text()),
        status if status.is_client_error() => {
            AppError::InvalidInput(format!("Failed to read {}: {}", what, err.body_text()))
        }
        _ => AppError::Io(format!("Failed to read {}: {}", what, err.body_text())),
    }
}

/// Read the whole multipart body. Unknown fields are skipped; a second `file`
/// field is rejected, as is a file larger than `max_file_bytes`.
pub async fn extract_upload(
    mut multipart: Multipart,
    max_file_bytes: usize,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "multipart"))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == FILE_FIELD {
            if form.file.is_some() {
                return Err(AppError::InvalidInput(
                    "Multiple file fields are not allowed; send exactly one field named 'file'"
                        .to_string(),
                ));
            }
            let filename = field
                .file_name()
                .map(|s: &str| s.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let content_type = field
                .content_type()
                .map(|s: &str| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());

            let data = field
                .bytes()
                .await
                .map_err(|e| multipart_error(e, "file data"))?;
            if data.len() > max_file_bytes {
                return Err(too_large(format!(
                    "{} bytes, limit is {} bytes",
                    data.len(),
                    max_file_bytes
                )));
            }

            form.file = Some(UploadedFile {
                data,
                filename,
                content_type,
            });
        } else if field_name == LOCATIONS_FIELD {
            let text = field
                .text()
                .await
                .map_err(|e| multipart_error(e, "locations"))?;
            form.locations = Some(text);
        }
    }

    Ok(form)
}
