//! docscrub API Library
//!
//! HTTP handlers, error rendering and application setup for the document
//! sanitization service.

mod api_doc;
pub mod constants;
mod handlers;
pub mod setup;
pub mod telemetry;
mod utils;

pub mod error;
pub mod state;

pub use error::ErrorResponse;
pub use state::AppState;
