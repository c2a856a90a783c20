pub mod redact;
pub mod sanitize;

use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::constants::DOWNLOAD_FILENAME;

/// Processed document as a PDF download.
pub(crate) fn pdf_download(body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DOWNLOAD_FILENAME),
            ),
        ],
        body,
    )
        .into_response()
}
