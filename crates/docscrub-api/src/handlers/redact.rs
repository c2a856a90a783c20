use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::pdf_download;
use crate::state::AppState;
use crate::utils::upload::extract_upload;
use axum::{
    extract::{Multipart, State},
    response::Response,
};
use docscrub_core::AppError;
use docscrub_processing::{ProcessingError, RedactionPlan};
use std::sync::Arc;

/// Redact rectangular areas of an uploaded document.
///
/// `locations` is JSON: an array of `{page, page_height, x0, y0, x1, y1}`
/// objects in top-left-origin coordinates, an object with a `locations` array,
/// or a single location object.
#[utoipa::path(
    post,
    path = "/remove-content",
    tag = "documents",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Redacted document", body = Vec<u8>, content_type = "application/pdf"),
        (status = 400, description = "No file uploaded or invalid locations", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Content removal failed", body = ErrorResponse)
    )
)]
pub async fn remove_content(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let (file, locations) = extract_upload(multipart, state.config.max_upload_size_bytes())
        .await?
        .require_file()?;

    let locations = locations.ok_or_else(|| {
        ProcessingError::InvalidLocations("missing 'locations' field".to_string())
    })?;
    let plan = RedactionPlan::parse(&locations)?;

    tracing::info!(
        filename = %file.filename,
        bytes = file.data.len(),
        pages = plan.page_count(),
        rectangles = plan.rectangle_count(),
        "Removing document content"
    );

    let redacted = state
        .sanitizer
        .redact(&file.data, &plan)
        .await
        .map_err(content_removal_failed)?;

    Ok(pdf_download(redacted))
}

fn content_removal_failed(err: ProcessingError) -> AppError {
    match err {
        ProcessingError::ToolExecution { .. } => AppError::ToolExecution {
            message: "Content removal failed".to_string(),
            diagnostics: Some(AppError::from(err).detailed_message()),
        },
        other => other.into(),
    }
}
