//! Route paths and fixed response values.

use std::time::Duration;

pub const REMOVE_METADATA_PATH: &str = "/remove-metadata";
pub const REMOVE_CONTENT_PATH: &str = "/remove-content";
pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Multipart field carrying the document.
pub const FILE_FIELD: &str = "file";
/// Multipart field carrying redaction locations as JSON.
pub const LOCATIONS_FIELD: &str = "locations";

/// Filename offered to the client for every processed document.
pub const DOWNLOAD_FILENAME: &str = "processed.pdf";

/// Upper bound on the `/health` tool probe.
pub const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
