//! Application state shared by all handlers.

use docscrub_core::Config;
use docscrub_processing::DocumentSanitizer;

/// Everything a request needs. Holds no per-request data: each request owns
/// its own temporary resources inside the sanitizer calls.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sanitizer: DocumentSanitizer,
}
