use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::pdf_download;
use crate::state::AppState;
use crate::utils::upload::extract_upload;
use axum::{
    extract::{Multipart, State},
    response::Response,
};
use std::sync::Arc;

/// Strip metadata from an uploaded document.
#[utoipa::path(
    post,
    path = "/remove-metadata",
    tag = "documents",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Sanitized document", body = Vec<u8>, content_type = "application/pdf"),
        (status = 400, description = "No file uploaded", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Sanitization failed", body = ErrorResponse)
    )
)]
pub async fn remove_metadata(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let (file, _) = extract_upload(multipart, state.config.max_upload_size_bytes())
        .await?
        .require_file()?;

    tracing::info!(
        filename = %file.filename,
        content_type = %file.content_type,
        bytes = file.data.len(),
        "Removing document metadata"
    );

    let sanitized = state.sanitizer.process(&file.data).await?;

    Ok(pdf_download(sanitized))
}
