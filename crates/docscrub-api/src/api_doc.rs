use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "docscrub",
        description = "Strips metadata from, and redacts areas of, uploaded PDF documents."
    ),
    paths(
        handlers::sanitize::remove_metadata,
        handlers::redact::remove_content,
    ),
    components(schemas(ErrorResponse)),
    tags(
        (name = "documents", description = "Document sanitization")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
