//! Document processing: request-scoped temporary resources, the qpdf wrapper and
//! the sanitization / redaction pipelines built on top of them.

pub mod error;
pub mod qpdf;
pub mod redaction;
pub mod sanitizer;
pub mod temp;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::ProcessingError;
pub use qpdf::QpdfService;
pub use redaction::{Location, RedactionPlan};
pub use sanitizer::DocumentSanitizer;
pub use temp::{ScratchArea, TempResource};
